use anyhow::Context;
use fibre_core::prelude::*;
use fibre_devtools::Inspector;

fn counter(cx: &mut Scope<'_>, props: &Props) -> Element {
    let label = props.str("label").unwrap_or("Count").to_string();
    let (count, set_count) = cx.use_state(|| 0i64);

    cx.use_effect(Some(count), move || {
        log::info!("count changed to {count}");
    });

    let inc = set_count.clone();
    let dec = set_count;
    Some(
        element("div").attr("class", "counter").with_children([
            element("span").child(format!("{label}: {count}")),
            element("button")
                .attr("id", "inc")
                .on("click", move || inc.update(|c| c + 1))
                .child("Increment"),
            element("button")
                .attr("id", "dec")
                .on("click", move || dec.update(|c| c - 1))
                .child("Decrement"),
        ]),
    )
}

fn app(_cx: &mut Scope<'_>, _props: &Props) -> Element {
    Some(fragment([
        element("h1").child("fibre"),
        component(counter, Props::new().with("label", "Clicks")),
    ]))
}

fn button(root: &Root<MemoryHost>, id: &str) -> anyhow::Result<HostId> {
    let host = root.host();
    host.find_all(*root.container(), "button")
        .into_iter()
        .find(|b| {
            host.node(*b)
                .and_then(|n| n.props.get("id"))
                .and_then(Value::as_str)
                == Some(id)
        })
        .with_context(|| format!("no button #{id}"))
}

/// Services idle callbacks until the scheduler runs dry.
fn settle(
    root: &mut Root<MemoryHost>,
    idle: &ManualScheduler,
    inspector: &mut Inspector,
) -> anyhow::Result<()> {
    while let Some(ticket) = idle.next() {
        let tick = root.tick(ticket)?;
        log::debug!("tick {}: {tick:?}", ticket.id());
    }
    inspector.observe(root);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let idle = ManualScheduler::new();
    let mut host = MemoryHost::new();
    let body = host.create_container("body");
    let mut root = Root::with_config(
        host,
        body,
        component(app, Props::new()),
        idle.clone(),
        RootConfig::new().label("counter"),
    );
    let mut inspector = Inspector::new();
    inspector.hud.toggle_inspector();

    settle(&mut root, &idle, &mut inspector)?;
    println!("{}", root.host().inner_markup(body));

    for id in ["inc", "inc", "inc", "dec"] {
        let target = button(&root, id)?;
        root.host().dispatch(target, "click");
        settle(&mut root, &idle, &mut inspector)?;
        println!("{}", root.host().inner_markup(body));
    }

    println!("{}", inspector.hud.summary());
    root.unmount();
    Ok(())
}
