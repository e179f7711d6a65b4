//! indicatif rendering of the core progress events. One bar per benchmark id,
//! created lazily, so a pool run shows a live bar per member.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use mpb_core::report::{ProgressEvent, ProgressSink};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct ProgressRenderer {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl ProgressRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        })
    }

    pub fn sink(self: &Arc<Self>) -> ProgressSink {
        let this = self.clone();
        Arc::new(move |event: ProgressEvent| this.update(event))
    }

    fn update(&self, event: ProgressEvent) {
        let mut bars = self.bars.lock().unwrap();
        let bar = bars.entry(event.benchmark.clone()).or_insert_with(|| {
            let bar = self.multi.add(ProgressBar::new(event.total as u64));
            bar.set_style(
                ProgressStyle::with_template(
                    "{prefix:>24} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .expect("progress template")
                .progress_chars("=> "),
            );
            bar.set_prefix(event.benchmark.clone());
            bar
        });
        bar.set_length(event.total as u64);
        bar.set_position(event.completed as u64);
        bar.set_message(format!(
            "{} ({}/{})",
            event.planner,
            event.planner_index + 1,
            event.planner_count
        ));
    }

    pub fn finish(&self) {
        for bar in self.bars.lock().unwrap().values() {
            bar.finish();
        }
    }
}
