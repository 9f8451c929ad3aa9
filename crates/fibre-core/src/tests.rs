#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    use web_time::{Duration, Instant};

    use crate::*;

    thread_local! {
        static EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
        static ARMED: Cell<bool> = const { Cell::new(false) };
        static READING: Cell<i64> = const { Cell::new(0) };
    }

    fn record(event: impl Into<String>) {
        EVENTS.with(|e| e.borrow_mut().push(event.into()));
    }

    fn events() -> Vec<String> {
        EVENTS.with(|e| std::mem::take(&mut *e.borrow_mut()))
    }

    fn setup(app: Node) -> (Root<MemoryHost>, Rc<ManualScheduler>, HostId) {
        let idle = ManualScheduler::new();
        let mut host = MemoryHost::new();
        let body = host.create_container("body");
        let root = Root::mount(host, body, app, idle.clone());
        (root, idle, body)
    }

    fn markup(root: &Root<MemoryHost>) -> String {
        root.host().inner_markup(*root.container())
    }

    struct Panel {
        depth: i64,
    }

    impl Stateful for Panel {
        fn create(props: &Props, _this: This<Self>) -> Self {
            let depth = props.int("depth").unwrap_or(0);
            record(format!("create {depth}"));
            Panel { depth }
        }

        fn will_render(&mut self, props: &Props) {
            self.depth = props.int("depth").unwrap_or(0);
        }

        fn render(&self, _props: &Props) -> Element {
            let section = element("section").attr("label", format!("panel {}", self.depth));
            Some(if self.depth > 0 {
                section.child(stateful::<Panel>(
                    Props::new().with("depth", self.depth - 1),
                ))
            } else {
                section
            })
        }

        fn did_mount(&mut self) {
            record(format!("mount {}", self.depth));
        }

        fn did_update(&mut self) {
            record(format!("update {}", self.depth));
        }

        fn will_unmount(&mut self) {
            record(format!("unmount {}", self.depth));
        }
    }

    struct Clicker {
        count: i64,
        this: This<Clicker>,
    }

    impl Stateful for Clicker {
        fn create(_props: &Props, this: This<Self>) -> Self {
            Clicker { count: 0, this }
        }

        fn render(&self, _props: &Props) -> Element {
            let this = self.this.clone();
            Some(
                element("button")
                    .on("click", move || this.set_state(|c| c.count += 1))
                    .child(self.count),
            )
        }

        fn did_update(&mut self) {
            record(format!("clicked {}", self.count));
        }
    }

    fn counter(cx: &mut Scope<'_>, _props: &Props) -> Element {
        let (n, set_n) = cx.use_state(|| 0);
        Some(
            element("button")
                .on("click", move || set_n.update(|n| n + 1))
                .child(n),
        )
    }

    fn list(title: &str, items: &[&str]) -> Node {
        element("ul")
            .attr("title", title)
            .with_children(items.iter().map(|s| element("li").child(*s)))
    }

    #[test]
    fn test_matched_positions_keep_host_nodes() {
        let (mut root, _idle, body) = setup(list("x", &["a", "b"]));
        root.flush().unwrap();
        let ul = root.host().find(body, "ul").unwrap();
        let items = root.host().find_all(body, "li");
        root.host_mut().take_ops();

        root.render(list("y", &["a", "b"]));
        root.flush().unwrap();

        assert_eq!(root.host().find_all(body, "li"), items);
        assert_eq!(
            root.host_mut().take_ops(),
            vec![HostOp::SetProperty {
                id: ul,
                key: "title".into(),
                value: "y".into(),
            }]
        );
    }

    #[test]
    fn test_text_change_replaces_content_in_place() {
        let (mut root, _idle, body) = setup(element("p").child("hi"));
        root.flush().unwrap();
        root.host_mut().take_ops();

        root.render(element("p").child("ho"));
        root.flush().unwrap();

        let ops = root.host_mut().take_ops();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], HostOp::SetText { content, .. } if content == "ho"));
        assert_eq!(root.host().inner_markup(body), "<p>ho</p>");
    }

    #[test]
    fn test_kind_change_replaces_whole_subtree() {
        events();
        let (mut root, _idle, body) =
            setup(element("div").child(stateful::<Panel>(Props::new().with("depth", 1))));
        root.flush().unwrap();
        assert_eq!(events(), ["create 1", "create 0", "mount 1", "mount 0"]);
        let old_sections = root.host().find_all(body, "section");
        assert_eq!(old_sections.len(), 2);

        root.render(element("div").child(element("section")));
        root.flush().unwrap();

        assert_eq!(events(), ["unmount 1", "unmount 0"]);
        for id in old_sections {
            assert!(root.host().node(id).is_none());
        }
        let fresh = root.host().find(body, "section").unwrap();
        assert!(root.host().node(fresh).unwrap().props.is_empty());
        assert_eq!(root.host().inner_markup(body), "<div><section></section></div>");
    }

    #[test]
    fn test_replacement_keeps_sibling_order() {
        let page = |middle: Node| {
            element("div")
                .child(element("span").child("a"))
                .child(fragment([middle, element("em").child("c")]))
                .child(element("span").child("d"))
        };
        let (mut root, _idle, body) = setup(page(element("em").child("b")));
        root.flush().unwrap();
        assert_eq!(
            root.host().inner_markup(body),
            "<div><span>a</span><em>b</em><em>c</em><span>d</span></div>"
        );

        root.render(page(element("strong").child("b")));
        root.flush().unwrap();
        assert_eq!(
            root.host().inner_markup(body),
            "<div><span>a</span><strong>b</strong><em>c</em><span>d</span></div>"
        );

        root.render(
            element("div")
                .child(element("span").child("a"))
                .child(fragment([element("b").child("1"), element("b").child("2")]))
                .child(element("span").child("d")),
        );
        root.flush().unwrap();
        assert_eq!(
            root.host().inner_markup(body),
            "<div><span>a</span><b>1</b><b>2</b><span>d</span></div>"
        );
    }

    #[test]
    fn test_state_survives_match_and_resets_after_removal() {
        let with_counter = || element("div").child(component(counter, Props::new()));
        let (mut root, idle, body) = setup(with_counter());
        root.flush().unwrap();

        let button = root.host().find(body, "button").unwrap();
        root.host().dispatch(button, "click");
        root.host().dispatch(button, "click");
        root.flush().unwrap();
        assert_eq!(markup(&root), "<div><button>2</button></div>");

        root.render(with_counter());
        root.flush().unwrap();
        assert_eq!(markup(&root), "<div><button>2</button></div>");

        root.render(element("div").child(element("p")));
        root.flush().unwrap();
        root.render(with_counter());
        root.flush().unwrap();
        assert_eq!(markup(&root), "<div><button>0</button></div>");
        assert!(idle.is_empty());
    }

    #[test]
    fn test_setting_equal_state_schedules_nothing() {
        let setter: Rc<RefCell<Option<Setter<i32>>>> = Rc::new(RefCell::new(None));
        let app = {
            let setter = setter.clone();
            component(
                move |cx, _p| {
                    let (v, set) = cx.use_state(|| 7);
                    *setter.borrow_mut() = Some(set);
                    Some(text(v))
                },
                Props::new(),
            )
        };
        let (mut root, idle, _body) = setup(app);
        root.flush().unwrap();

        let set = setter.borrow().clone().unwrap();
        set.set(7);
        assert!(idle.is_empty());
        assert!(!root.has_pending_work());
        set.set(8);
        assert_eq!(idle.pending(), 1);
        root.flush().unwrap();
        assert_eq!(markup(&root), "8");
    }

    fn effectful(cx: &mut Scope<'_>, props: &Props) -> Element {
        let dep = props.int("dep").unwrap_or(0);
        cx.use_effect(Some(dep), move || {
            record(format!("run {dep}"));
            on_cleanup(move || record(format!("cleanup {dep}")))
        });
        cx.use_effect_always(|| record("always"));
        None
    }

    #[test]
    fn test_effects_follow_dependency_law() {
        events();
        let with_dep = |dep: i64| component(effectful, Props::new().with("dep", dep));
        let (mut root, _idle, _body) = setup(with_dep(1));
        root.flush().unwrap();
        assert_eq!(events(), ["run 1", "always"]);

        root.render(with_dep(1));
        root.flush().unwrap();
        assert_eq!(events(), ["always"]);

        root.render(with_dep(2));
        root.flush().unwrap();
        assert_eq!(events(), ["cleanup 1", "run 2", "always"]);

        root.unmount();
        assert_eq!(events(), ["cleanup 2"]);
    }

    #[test]
    fn test_effects_run_before_lifecycle_callbacks() {
        events();
        fn logger(cx: &mut Scope<'_>, _p: &Props) -> Element {
            cx.use_effect(Some(()), || record("effect"));
            None
        }
        let app = element("div")
            .child(stateful::<Panel>(Props::new()))
            .child(component(logger, Props::new()));
        let (mut root, _idle, _body) = setup(app);
        root.flush().unwrap();
        assert_eq!(events(), ["create 0", "effect", "mount 0"]);
    }

    #[test]
    fn test_stateful_set_state_rerenders() {
        events();
        let (mut root, _idle, body) = setup(stateful::<Clicker>(Props::new()));
        root.flush().unwrap();
        assert_eq!(markup(&root), "<button>0</button>");

        let button = root.host().find(body, "button").unwrap();
        assert_eq!(root.host().dispatch(button, "click"), 1);
        root.flush().unwrap();
        assert_eq!(markup(&root), "<button>1</button>");
        assert_eq!(root.host().find(body, "button"), Some(button));
        assert_eq!(root.host().node(button).unwrap().listener_count("click"), 1);
        assert_eq!(events(), ["clicked 1"]);
    }

    #[test]
    fn test_host_tree_never_shows_half_a_pass() {
        let (mut root, idle, _body) = setup(list("old", &["1", "2", "3"]));
        root.flush().unwrap();
        let old = markup(&root);

        root.render(list("new", &["4", "5", "6", "7", "8"]));
        let mut seen = Vec::new();
        let mut ticks = Vec::new();
        while let Some(ticket) = idle.next() {
            ticks.push(root.run_idle(ticket, &mut StepBudget::new(1)).unwrap());
            seen.push(markup(&root));
        }
        let new = seen.last().cloned().unwrap();

        assert_eq!(new, markup(&root));
        assert_ne!(new, old);
        assert!(seen.iter().all(|m| *m == old || *m == new));
        assert_eq!(ticks.last(), Some(&Tick::Committed));
        assert!(ticks.iter().filter(|t| **t == Tick::Yielded).count() > 1);
        assert_eq!(root.stats().unwrap().yields, ticks.len() - 1);
    }

    #[test]
    fn test_appending_a_span_updates_first_and_inserts_second() {
        let (mut root, idle, body) = setup(element("div").child(element("span").child("a")));
        root.flush().unwrap();
        let first = root.host().find(body, "span").unwrap();

        root.render(
            element("div")
                .child(element("span").child("a"))
                .child(element("span").child("b")),
        );
        let ticket = idle.next().unwrap();
        assert_eq!(
            root.run_idle(ticket, &mut StepBudget::new(5)),
            Ok(Tick::Yielded)
        );
        let elements: Vec<(String, DiffTag)> = root
            .pending_diff()
            .into_iter()
            .filter(|(kind, _)| kind.starts_with('<'))
            .collect();
        assert_eq!(
            elements,
            vec![
                ("<div>".to_string(), DiffTag::Update),
                ("<span>".to_string(), DiffTag::Update),
                ("<span>".to_string(), DiffTag::Insert),
            ]
        );

        let ticket = idle.next().unwrap();
        assert_eq!(root.run_idle(ticket, &mut Unbounded), Ok(Tick::Committed));
        let spans = root.host().find_all(body, "span");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0], first);
        assert_eq!(markup(&root), "<div><span>a</span><span>b</span></div>");
        let stats = root.stats().unwrap();
        assert_eq!((stats.inserted, stats.deleted), (2, 0));
    }

    #[test]
    fn test_runaway_updates_fail_loudly() {
        fn runaway(cx: &mut Scope<'_>, _p: &Props) -> Element {
            let (n, set_n) = cx.use_state(|| 0_i64);
            cx.use_effect_always(move || set_n.set(n + 1));
            Some(text(n))
        }
        let (mut root, _idle, _body) = setup(component(runaway, Props::new()));
        assert_eq!(root.flush(), Err(Error::RenderLoop { limit: 100 }));
        assert!(!root.has_pending_work());
        assert_eq!(markup(&root), "100");
    }

    #[test]
    fn test_settling_updates_are_not_a_loop() {
        fn settles(cx: &mut Scope<'_>, _p: &Props) -> Element {
            let (n, set_n) = cx.use_state(|| 0_i64);
            cx.use_effect(Some(n), move || {
                if n < 50 {
                    set_n.set(n + 1);
                }
            });
            Some(text(n))
        }
        let (mut root, _idle, _body) = setup(component(settles, Props::new()));
        assert_eq!(root.flush(), Ok(()));
        assert_eq!(markup(&root), "50");
    }

    #[test]
    fn test_limit_comes_from_config() {
        fn runaway(cx: &mut Scope<'_>, _p: &Props) -> Element {
            let (n, set_n) = cx.use_state(|| 0_i64);
            cx.use_effect_always(move || set_n.set(n + 1));
            None
        }
        let idle = ManualScheduler::new();
        let mut host = MemoryHost::new();
        let body = host.create_container("body");
        let mut root = Root::with_config(
            host,
            body,
            component(runaway, Props::new()),
            idle.clone(),
            RootConfig::new().rerender_limit(3).label("small"),
        );
        assert_eq!(root.flush(), Err(Error::RenderLoop { limit: 3 }));
    }

    fn fragile(explode: &Rc<Cell<bool>>, n: i64) -> Node {
        let explode = explode.clone();
        component(
            move |_cx, props| {
                if explode.get() {
                    panic!("render failed");
                }
                Some(element("p").child(props.int("n").unwrap_or_default()))
            },
            Props::new().with("n", n),
        )
    }

    #[test]
    fn test_panic_leaves_committed_tree_intact() {
        let explode = Rc::new(Cell::new(false));
        let (mut root, _idle, _body) = setup(fragile(&explode, 1));
        root.flush().unwrap();
        assert_eq!(markup(&root), "<p>1</p>");
        let committed = root.work_nodes();

        explode.set(true);
        root.render(fragile(&explode, 2));
        let result = catch_unwind(AssertUnwindSafe(|| root.flush()));
        assert!(result.is_err());
        assert_eq!(markup(&root), "<p>1</p>");

        explode.set(false);
        root.flush().unwrap();
        assert_eq!(markup(&root), "<p>2</p>");
        assert_eq!(root.work_nodes(), committed);
    }

    #[test]
    fn test_refs_follow_host_nodes() {
        events();
        let input_ref = create_ref();
        let (mut root, _idle, body) =
            setup(element("form").child(element("input").node_ref(&input_ref)));
        root.flush().unwrap();
        let input = root.host().find(body, "input").unwrap();
        assert_eq!(input_ref.get::<HostId>(), Some(input));

        root.render(element("form").child(element("select")));
        root.flush().unwrap();
        assert!(!input_ref.is_attached());

        fn focused(cx: &mut Scope<'_>, _p: &Props) -> Element {
            let slot = cx.use_ref(create_ref);
            let node_ref = slot.get();
            cx.use_effect(Some(()), move || {
                record(format!("attached {}", node_ref.is_attached()));
            });
            Some(element("input").node_ref(&slot.get()))
        }
        root.render(component(focused, Props::new()));
        root.flush().unwrap();
        assert_eq!(events(), ["attached true"]);
    }

    #[test]
    fn test_stale_tickets_are_ignored() {
        let (mut root, idle, _body) = setup(element("p"));
        let first = idle.next().unwrap();
        root.render(element("p").child("later"));
        let second = idle.next().unwrap();
        assert_ne!(first, second);

        assert_eq!(root.run_idle(first, &mut Unbounded), Ok(Tick::Stale));
        assert_eq!(root.run_idle(second, &mut Unbounded), Ok(Tick::Committed));
        assert_eq!(root.run_idle(second, &mut Unbounded), Ok(Tick::Stale));
        assert_eq!(markup(&root), "<p>later</p>");
    }

    #[test]
    fn test_update_mid_pass_restarts_from_root() {
        let (mut root, idle, _body) = setup(list("a", &["1"]));
        root.flush().unwrap();

        root.render(list("b", &["2", "3"]));
        let ticket = idle.next().unwrap();
        assert_eq!(
            root.run_idle(ticket, &mut StepBudget::new(1)),
            Ok(Tick::Yielded)
        );
        assert_eq!(idle.pending(), 1);

        root.render(list("c", &["4"]));
        assert_eq!(idle.pending(), 1);
        let ticket = idle.next().unwrap();
        assert_eq!(root.run_idle(ticket, &mut Unbounded), Ok(Tick::Committed));

        assert_eq!(markup(&root), r#"<ul title="c"><li>4</li></ul>"#);
        let stats = root.stats().unwrap();
        assert_eq!((stats.pass, stats.restarts, stats.yields), (2, 1, 1));
    }

    #[test]
    fn test_tick_drives_to_completion() {
        let (mut root, idle, _body) = setup(list("t", &["1", "2", "3"]));
        let mut last = Tick::Idle;
        while let Some(ticket) = idle.next() {
            last = root.tick(ticket).unwrap();
        }
        assert_eq!(last, Tick::Committed);
        assert_eq!(
            markup(&root),
            r#"<ul title="t"><li>1</li><li>2</li><li>3</li></ul>"#
        );
    }

    #[test]
    fn test_unmount_tears_everything_down() {
        events();
        let app = element("div")
            .child(stateful::<Panel>(Props::new()))
            .child(component(effectful, Props::new().with("dep", 9)));
        let (mut root, idle, body) = setup(app);
        root.flush().unwrap();
        events();

        root.unmount();
        assert_eq!(events(), ["unmount 0", "cleanup 9"]);
        assert!(root.host().children(body).is_empty());
        assert!(!root.is_mounted());
        assert_eq!(root.work_nodes(), 0);
        assert!(idle.is_empty());
        assert_eq!(root.remount(), Err(Error::Unmounted));
        assert_eq!(root.flush(), Ok(()));
    }

    #[test]
    fn test_remount_starts_from_fresh_state() {
        let (mut root, _idle, body) = setup(component(counter, Props::new()));
        root.flush().unwrap();
        let button = root.host().find(body, "button").unwrap();
        root.host().dispatch(button, "click");
        root.flush().unwrap();
        assert_eq!(markup(&root), "<button>1</button>");

        root.remount().unwrap();
        root.flush().unwrap();
        assert_eq!(markup(&root), "<button>0</button>");
        assert_ne!(root.host().find(body, "button"), Some(button));
    }

    #[test]
    fn test_updates_after_unmount_are_harmless() {
        let (mut root, idle, _body) = setup(component(counter, Props::new()));
        root.flush().unwrap();
        let updater = root.updater();

        root.unmount();
        updater.request_rerender();
        assert!(!root.has_pending_work());
        assert_eq!(root.flush(), Ok(()));
        let ticket = idle.next().unwrap();
        assert_eq!(root.run_idle(ticket, &mut Unbounded), Ok(Tick::Idle));
        assert_eq!(markup(&root), "");
    }

    fn page_a(cx: &mut Scope<'_>, _p: &Props) -> Element {
        let (n, _set_n) = cx.use_state(|| 1);
        record(format!("a sees {n}"));
        Some(element("p").child(n))
    }

    fn page_b(cx: &mut Scope<'_>, _p: &Props) -> Element {
        let (n, _set_n) = cx.use_state(|| 2);
        record(format!("b sees {n}"));
        Some(element("p").child(n))
    }

    #[test]
    fn test_function_pointers_are_told_apart() {
        events();
        let pages: [RenderPtr; 2] = [page_a, page_b];
        let (mut root, _idle, _body) = setup(component(pages[0], Props::new()));
        root.flush().unwrap();

        root.render(component(pages[1], Props::new()));
        root.flush().unwrap();
        assert_eq!(events(), ["a sees 1", "b sees 2"]);
        assert_eq!(markup(&root), "<p>2</p>");
        assert_eq!(root.stats().unwrap().deleted, 1);

        root.render(component(pages[1], Props::new()));
        root.flush().unwrap();
        assert_eq!(events(), ["b sees 2"]);
        assert_eq!(root.stats().unwrap().deleted, 0);
    }

    /// Panics the first time it is unmounted while `ARMED` is set.
    struct Fuse;

    impl Stateful for Fuse {
        fn create(_props: &Props, _this: This<Self>) -> Self {
            Fuse
        }

        fn render(&self, _props: &Props) -> Element {
            Some(element("i"))
        }

        fn will_unmount(&mut self) {
            record("fuse unmount");
            if ARMED.with(|a| a.replace(false)) {
                panic!("unmount failed");
            }
        }
    }

    #[test]
    fn test_unmount_panic_leaves_host_untouched() {
        events();
        ARMED.with(|a| a.set(true));
        let (mut root, _idle, _body) = setup(
            element("div")
                .child(element("span"))
                .child(stateful::<Fuse>(Props::new())),
        );
        root.flush().unwrap();

        root.render(element("div").child(element("b")).child(element("em")));
        let result = catch_unwind(AssertUnwindSafe(|| root.flush()));
        assert!(result.is_err());
        assert_eq!(markup(&root), "<div><span></span><i></i></div>");

        root.flush().unwrap();
        assert_eq!(markup(&root), "<div><b></b><em></em></div>");
        assert_eq!(events(), ["fuse unmount"]);
        assert_eq!(root.work_nodes(), 4);
    }

    struct Gauge {
        this: This<Gauge>,
    }

    impl Stateful for Gauge {
        fn create(_props: &Props, this: This<Self>) -> Self {
            Gauge { this }
        }

        fn render(&self, _props: &Props) -> Element {
            let this = self.this.clone();
            Some(
                element("meter")
                    .on("click", move || this.force_update())
                    .child(READING.with(Cell::get)),
            )
        }

        fn did_update(&mut self) {
            record("gauge update");
        }
    }

    #[test]
    fn test_force_update_rerenders_without_state_change() {
        events();
        READING.with(|r| r.set(0));
        let (mut root, idle, body) = setup(stateful::<Gauge>(Props::new()));
        root.flush().unwrap();
        assert_eq!(markup(&root), "<meter>0</meter>");

        READING.with(|r| r.set(5));
        assert!(idle.is_empty());
        let meter = root.host().find(body, "meter").unwrap();
        root.host().dispatch(meter, "click");
        assert_eq!(idle.pending(), 1);
        root.flush().unwrap();
        assert_eq!(markup(&root), "<meter>5</meter>");
        assert_eq!(events(), ["gauge update"]);
    }

    fn tally(cx: &mut Scope<'_>, _p: &Props) -> Element {
        let renders = cx.use_ref(|| 0);
        renders.set(renders.get() + 1);
        Some(text(renders.get()))
    }

    #[test]
    fn test_ref_value_carries_across_passes() {
        let (mut root, idle, _body) = setup(component(tally, Props::new()));
        root.flush().unwrap();
        root.render(component(tally, Props::new()));
        root.flush().unwrap();
        root.render(component(tally, Props::new()));
        root.flush().unwrap();
        assert_eq!(markup(&root), "3");
        assert!(idle.is_empty());

        root.render(element("p"));
        root.flush().unwrap();
        root.render(component(tally, Props::new()));
        root.flush().unwrap();
        assert_eq!(markup(&root), "1");
    }

    fn drifting(cx: &mut Scope<'_>, props: &Props) -> Element {
        match props.int("mode").unwrap_or(0) {
            0 => {
                let (n, _set_n) = cx.use_state(|| 1);
                Some(text(n))
            }
            1 => {
                let r = cx.use_ref(|| 10);
                Some(text(r.get()))
            }
            _ => {
                let r = cx.use_ref(|| 10);
                let (n, _set_n) = cx.use_state(|| 5);
                Some(text(r.get() + n))
            }
        }
    }

    fn drift(mode: i64) -> Node {
        component(drifting, Props::new().with("mode", mode))
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_hook_drift_replaces_the_slot() {
        let (mut root, _idle, _body) = setup(drift(0));
        root.flush().unwrap();
        assert_eq!(markup(&root), "1");

        root.render(drift(1));
        root.flush().unwrap();
        assert_eq!(markup(&root), "10");

        root.render(drift(2));
        root.flush().unwrap();
        assert_eq!(markup(&root), "15");
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "changed kind between passes")]
    fn test_hook_drift_asserts_in_debug_builds() {
        let (mut root, _idle, _body) = setup(drift(0));
        root.flush().unwrap();
        root.render(drift(1));
        let _ = root.flush();
    }

    fn slow(clock: &TestClock) -> Node {
        let clock = clock.clone();
        component(
            move |_cx, _p| {
                clock.advance(Duration::from_millis(3));
                Some(text("x"))
            },
            Props::new(),
        )
    }

    #[test]
    fn test_tick_yields_when_the_clock_runs_out() {
        let clock = TestClock::new(Instant::now());
        let idle = ManualScheduler::new();
        let mut host = MemoryHost::new();
        let body = host.create_container("body");
        let mut root = Root::with_config(
            host,
            body,
            element("div").with_children((0..5).map(|_| slow(&clock))),
            idle.clone(),
            RootConfig::new().clock(clock.clone()),
        );

        let mut ticks = Vec::new();
        while let Some(ticket) = idle.next() {
            ticks.push(root.tick(ticket).unwrap());
        }
        assert_eq!(ticks, [Tick::Yielded, Tick::Committed]);
        assert_eq!(markup(&root), "<div>xxxxx</div>");
        let stats = root.stats().unwrap();
        assert_eq!(stats.yields, 1);
        assert_eq!(stats.commit_time, Duration::ZERO);
    }
}
