#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::time::Duration;

    use crate::prelude::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn landing_page(host: &SimHost) -> (ElementId, ElementId, ElementId, ElementId) {
        host.spawn("nav").class("navbar").attach();
        let card = host.spawn("div").class("feature-card").attach();
        let stat = host.spawn("span").attr("data-count", "150").attach();
        let bar = host
            .spawn("div")
            .class("progress-bar")
            .attr("data-progress", "75%")
            .style("width", "75%")
            .attach();
        let plain = host.spawn("div").class("testimonial").text("quiet").attach();
        (card, stat, bar, plain)
    }

    #[test]
    fn counter_ramps_from_zero_to_exact_target() {
        let host = Rc::new(SimHost::new());
        let (_, stat, _, _) = landing_page(&host);
        let page = enhance_page(host.clone(), EnhanceConfig::default());

        host.set_visibility(stat, 0.4);
        assert_eq!(
            page.revealer().state(stat, RevealKind::CounterRamp),
            Some(RevealState::Fired)
        );
        host.run_frame();
        assert_eq!(host.text(stat), "0");

        let mut last = 0;
        for _ in 0..10 {
            host.advance(ms(180));
            let now: u64 = host.text(stat).parse().unwrap();
            assert!(now >= last && now <= 150);
            last = now;
        }
        host.advance(ms(200));
        assert_eq!(host.text(stat), "150");
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn progress_bar_collapses_then_expands() {
        let host = Rc::new(SimHost::new());
        let (_, _, bar, _) = landing_page(&host);
        let _page = enhance_page(host.clone(), EnhanceConfig::default());

        host.set_visibility(bar, 0.5);
        assert_eq!(host.style(bar, "width").as_deref(), Some("0%"));
        host.advance(ms(150));
        assert_eq!(host.style(bar, "width").as_deref(), Some("0%"));
        host.advance(ms(60));
        assert_eq!(host.style(bar, "width").as_deref(), Some("75%"));
    }

    #[test]
    fn duplicate_notifications_fire_once() {
        let host = Rc::new(SimHost::new());
        let (card, stat, bar, _) = landing_page(&host);
        let page = enhance_page(host.clone(), EnhanceConfig::default());

        for el in [card, stat, bar] {
            host.notify_raw(el, 1.0);
            host.notify_raw(el, 1.0);
        }
        assert_eq!(host.class_list(card), "feature-card animate-in");
        assert_eq!(host.pending_timers(), 1);
        assert_eq!(host.pending_frames(), 1);
        for kind in RevealKind::ALL {
            assert_eq!(page.revealer().watching(kind), 0);
        }

        host.remove_class(card, "animate-in");
        host.notify_raw(card, 1.0);
        assert!(!host.has_class(card, "animate-in"));
    }

    #[test]
    fn unregistered_elements_are_untouched() {
        let host = Rc::new(SimHost::new());
        let (_, _, _, plain) = landing_page(&host);
        let page = enhance_page(host.clone(), EnhanceConfig::default());

        page.revealer().deliver(
            RevealKind::ClassToggle,
            &[IntersectionEntry {
                target: plain,
                ratio: 1.0,
                is_intersecting: true,
            }],
        );
        host.advance(ms(500));
        assert_eq!(host.class_list(plain), "testimonial");
        assert_eq!(host.text(plain), "quiet");
    }

    #[test]
    fn class_reveal_respects_threshold_and_margin() {
        let host = Rc::new(SimHost::new());
        let (card, _, _, _) = landing_page(&host);
        let page = enhance_page(host.clone(), EnhanceConfig::default());

        let options = host.observer_options(page.revealer().observer(RevealKind::ClassToggle));
        assert_eq!(options.threshold, 0.1);
        assert_eq!(options.root_margin.to_css(), "0px 0px -50px 0px");

        host.set_visibility(card, 0.05);
        assert!(!host.has_class(card, "animate-in"));
        host.set_visibility(card, 0.1);
        assert!(host.has_class(card, "animate-in"));
    }

    #[test]
    fn bootstrap_wires_every_behavior() {
        let host = Rc::new(SimHost::new());
        let (card, stat, bar, _) = landing_page(&host);
        host.spawn("a").attr("href", "#apply").attach();
        let form = host.spawn("form").class("needs-validation").attach();
        let group = host.spawn("div").child_of(form);
        let upload = host.spawn("input").attr("type", "file").child_of(group);
        host.spawn("label").text("Choose CV").child_of(group);
        host.spawn("button").attr("type", "submit").html("Apply").child_of(form);
        host.spawn("span").attr("data-count", "lots").attach();

        let page = enhance_page(host.clone(), EnhanceConfig::default());
        let summary = page.summary();
        assert!(summary.navbar);
        assert_eq!(summary.anchors, 1);
        assert_eq!(summary.reveal.registered, vec![card, stat, bar]);
        assert_eq!(summary.reveal.rejected.len(), 1);
        assert_eq!(summary.validated_forms, 1);
        assert_eq!(summary.file_inputs, 1);
        assert_eq!(summary.loading_forms, 1);
        assert!(host.is_observed(page.revealer().observer(RevealKind::CounterRamp), stat));
        assert!(host.is_observed(page.revealer().observer(RevealKind::ClassToggle), card));
        assert!(!host.is_observed(page.revealer().observer(RevealKind::ClassToggle), upload));
    }

    #[test]
    fn page_services_share_the_host() {
        let host = Rc::new(SimHost::new());
        let page = enhance_page(host.clone(), EnhanceConfig::default());

        assert!(page.storage().set("prefs", &vec!["dark"]));
        assert_eq!(page.storage().get::<Vec<String>>("prefs"), Some(vec!["dark".to_string()]));

        page.copy_to_clipboard("JOB-7");
        assert_eq!(host.clipboard_text().as_deref(), Some("JOB-7"));

        let dismiss = page.notify("Saved", NotificationKind::Info);
        assert_eq!(host.query_all(".alert").len(), 2);
        dismiss.run();
        assert_eq!(host.query_all(".alert").len(), 1);
        host.advance(ms(3000));
        assert!(host.query_all(".alert").is_empty());
    }

    #[test]
    fn started_ramp_outlives_the_page() {
        let host = Rc::new(SimHost::new());
        let (_, stat, _, _) = landing_page(&host);
        let page = enhance_page(host.clone(), EnhanceConfig::default());
        host.set_visibility(stat, 1.0);
        drop(page);
        host.advance(ms(2100));
        assert_eq!(host.text(stat), "150");
    }
}
