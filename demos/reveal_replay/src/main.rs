//! Replays a landing page against the in-memory host and prints what each
//! element looks like as it scrolls into view.
//!
//! `cargo run -p reveal_replay [config.json]`, with `RUST_LOG=debug` for the
//! reveal trace.

use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use log::info;
use unveil_core::prelude::*;

fn landing_page(host: &SimHost) -> Vec<(&'static str, ElementId)> {
    host.spawn("nav").class("navbar").attach();
    host.spawn("a").attr("href", "#stats").attach();
    let hero = host.spawn("div").class("feature-card").offset_top(200.0).attach();
    let step = host.spawn("div").class("step-card").offset_top(600.0).attach();
    let stats = host
        .spawn("section")
        .attr("id", "stats")
        .offset_top(1000.0)
        .attach();
    let jobs = host.spawn("span").attr("data-count", "1250").child_of(stats);
    let hires = host.spawn("span").attr("data-counter", "87").child_of(stats);
    let match_rate = host
        .spawn("div")
        .class("progress-bar")
        .attr("data-progress", "92%")
        .child_of(stats);
    vec![
        ("hero card", hero),
        ("step card", step),
        ("open jobs", jobs),
        ("hires", hires),
        ("match rate", match_rate),
    ]
}

fn describe(host: &SimHost, el: ElementId) -> String {
    format!(
        "class={:?} text={:?} width={:?}",
        host.class_list(el),
        host.text(el),
        host.style(el, "width").unwrap_or_default()
    )
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            EnhanceConfig::from_json(&raw).with_context(|| format!("parsing {path}"))?
        }
        None => EnhanceConfig::default(),
    };

    let host = Rc::new(SimHost::new());
    let elements = landing_page(&host);
    let page = enhance_page(host.clone(), config);
    for rejected in &page.summary().reveal.rejected {
        println!("rejected: {rejected}");
    }

    for (name, el) in &elements {
        host.set_scroll(host.offset_top(*el) - 300.0);
        host.set_visibility(*el, 0.6);
        host.advance(Duration::from_millis(500));
        println!("{name:>10} @500ms  {}", describe(&host, *el));
    }

    host.advance(Duration::from_millis(2000));
    println!("-- settled --");
    for (name, el) in &elements {
        println!("{name:>10}         {}", describe(&host, *el));
    }

    page.copy_to_clipboard("https://jobs.example/apply?ref=replay");
    info!(
        "clipboard holds {:?}",
        host.clipboard_text().unwrap_or_default()
    );
    Ok(())
}
