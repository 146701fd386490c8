// Example: an adapter driving the controller through a scripted scroll session.
use std::cell::Cell;
use std::rc::Rc;

use toolbar_visibility::{
    ContentSurface, Insets, ScrollSnapshot, ToolbarOptions, ToolbarView,
    ToolbarVisibilityController,
};

struct Page {
    snapshot: Cell<ScrollSnapshot>,
}

impl ContentSurface for Page {
    fn snapshot(&self) -> ScrollSnapshot {
        self.snapshot.get()
    }

    fn set_insets(&self, insets: Insets) {
        println!("  page: insets top={} bottom={}", insets.top, insets.bottom);
    }

    fn set_content_offset_y(&self, content_offset_y: f32) {
        let mut s = self.snapshot.get();
        s.content_offset_y = content_offset_y;
        self.snapshot.set(s);
        println!("  page: content_offset_y={content_offset_y}");
    }
}

struct Chrome;

impl ToolbarView for Chrome {
    fn set_offsets(&self, header_top: f32, footer_bottom: f32) {
        println!("  chrome: header_top={header_top:.1} footer_bottom={footer_bottom:.1}");
    }

    fn set_transform(&self, _header_dy: f32, _footer_dy: f32) {}

    fn set_content_alpha(&self, _alpha: f32) {}
}

fn main() {
    let page = Rc::new(Page {
        snapshot: Cell::new(ScrollSnapshot {
            content_offset_y: 0.0,
            content_height: 4_000.0,
            viewport_height: 800.0,
            is_zooming: false,
            is_loading: true,
        }),
    });
    let chrome = Rc::new(Chrome);
    let options = ToolbarOptions::new(50.0, 44.0)
        .with_base_animation_ms(250)
        .with_load_recheck_ms(150);
    let controller = match ToolbarVisibilityController::new(options, &page, &chrome) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("invalid options: {err}");
            return;
        }
    };

    let mut now_ms = 0u64;

    // Insets wait for the page to finish loading.
    println!("content size changed while loading");
    controller.on_content_size_changed(now_ms);
    now_ms += 250;
    let mut s = page.snapshot.get();
    s.is_loading = false;
    page.snapshot.set(s);
    controller.tick(now_ms);
    now_ms += 250;
    controller.tick(now_ms);

    println!("fling toward the end of the page");
    for _ in 0..6 {
        controller.on_drag_update(-12.0);
    }
    controller.on_drag_end(true);
    controller.on_deceleration_end();
    println!("position={:?}", controller.position());

    println!("tap near the bottom edge");
    controller.on_tap_in_dead_zone(790.0, 800.0, now_ms);
    // Simulate a 60fps "tick".
    while controller.is_animating() {
        now_ms += 16;
        controller.tick(now_ms);
    }
    println!("position={:?} stats={:?}", controller.position(), controller.stats());
}
