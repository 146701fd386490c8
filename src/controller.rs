use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

use crate::{
    ContentSurface, ControllerStats, GuardFlags, Insets, OptionsError, ScrollSnapshot, TimerId,
    TimerQueue, ToolbarOptions, ToolbarPosition, ToolbarState, ToolbarView, Tween,
};

/// Called once when a show request settles. The argument is `false` when the request was
/// superseded or interrupted before the toolbars reached the shown position.
pub type Completion = Box<dyn FnOnce(bool)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deferred {
    LoadRecheck,
    ContentSizeRecheck,
    KeyboardSettle,
    PageUnloadReveal,
    ZoomWatchdog,
}

/// At most one pending timer per kind.
#[derive(Clone, Copy, Debug, Default)]
struct PendingTimers {
    load_recheck: Option<TimerId>,
    content_size_recheck: Option<TimerId>,
    keyboard_settle: Option<TimerId>,
    page_unload_reveal: Option<TimerId>,
    zoom_watchdog: Option<TimerId>,
}

impl PendingTimers {
    fn slot_mut(&mut self, task: Deferred) -> &mut Option<TimerId> {
        match task {
            Deferred::LoadRecheck => &mut self.load_recheck,
            Deferred::ContentSizeRecheck => &mut self.content_size_recheck,
            Deferred::KeyboardSettle => &mut self.keyboard_settle,
            Deferred::PageUnloadReveal => &mut self.page_unload_reveal,
            Deferred::ZoomWatchdog => &mut self.zoom_watchdog,
        }
    }
}

struct Animation {
    tween: Tween,
    completion: Option<Completion>,
}

/// Clears its flag on drop, so every exit path of the guarded handler releases it.
struct ReentryGuard<'a>(&'a Cell<bool>);

impl<'a> ReentryGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self(flag))
    }
}

impl Drop for ReentryGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Scroll-driven show/hide state machine for a browser's header and footer toolbars.
///
/// One controller serves one content surface. It holds only weak handles to the surface and the
/// toolbar view; once either is gone every operation is a silent no-op.
///
/// The controller lives on a single dispatch context and every operation takes `&self`, so the
/// surface may call back into it synchronously (for example from `set_insets`). Deferred work
/// (load re-checks, keyboard settle, page-unload reveal, zoom watchdog) and show animations are
/// driven by the adapter calling [`ToolbarVisibilityController::tick`] with its clock.
///
/// Whatever the input, once interaction stops the toolbars rest either fully shown
/// (`header_top_offset == 0`) or fully hidden (`header_top_offset == -header_height`).
pub struct ToolbarVisibilityController {
    options: ToolbarOptions,
    surface: RefCell<Option<Weak<dyn ContentSurface>>>,
    toolbar: Weak<dyn ToolbarView>,

    state: Cell<ToolbarState>,
    guards: Cell<GuardFlags>,
    dragging: Cell<bool>,
    in_content_size_change: Cell<bool>,
    in_reveal: Cell<bool>,
    last_insets: Cell<Option<Insets>>,

    timers: RefCell<TimerQueue<Deferred>>,
    pending: Cell<PendingTimers>,
    animation: RefCell<Option<Animation>>,
    stats: Cell<ControllerStats>,
}

impl core::fmt::Debug for ToolbarVisibilityController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ToolbarVisibilityController")
            .field("options", &self.options)
            .field("attached", &self.is_attached())
            .field("state", &self.state.get())
            .field("guards", &self.guards.get())
            .field("dragging", &self.dragging.get())
            .field("animating", &self.is_animating())
            .field("stats", &self.stats.get())
            .finish_non_exhaustive()
    }
}

impl ToolbarVisibilityController {
    /// Creates a controller attached to `surface`, with the toolbars fully shown.
    pub fn new<S, V>(
        options: ToolbarOptions,
        surface: &Rc<S>,
        toolbar: &Rc<V>,
    ) -> Result<Self, OptionsError>
    where
        S: ContentSurface + 'static,
        V: ToolbarView + 'static,
    {
        options.validate()?;
        let surface = Rc::downgrade(surface);
        let surface: Weak<dyn ContentSurface> = surface;
        let toolbar = Rc::downgrade(toolbar);
        let toolbar: Weak<dyn ToolbarView> = toolbar;
        tdebug!(
            header_height = options.header_height,
            footer_height = options.footer_height,
            "ToolbarVisibilityController::new"
        );
        let c = Self {
            options,
            surface: RefCell::new(Some(surface)),
            toolbar,
            state: Cell::new(ToolbarState::default()),
            guards: Cell::new(GuardFlags::default()),
            dragging: Cell::new(false),
            in_content_size_change: Cell::new(false),
            in_reveal: Cell::new(false),
            last_insets: Cell::new(None),
            timers: RefCell::new(TimerQueue::new()),
            pending: Cell::new(PendingTimers::default()),
            animation: RefCell::new(None),
            stats: Cell::new(ControllerStats::default()),
        };
        c.reset_to_shown();
        Ok(c)
    }

    pub fn options(&self) -> &ToolbarOptions {
        &self.options
    }

    pub fn state(&self) -> ToolbarState {
        self.state.get()
    }

    pub fn guards(&self) -> GuardFlags {
        self.guards.get()
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats.get()
    }

    pub fn hidden_threshold(&self) -> f32 {
        self.options.hidden_threshold()
    }

    pub fn toolbars_showing(&self) -> bool {
        self.state.get().header_top_offset == 0.0
    }

    pub fn position(&self) -> ToolbarPosition {
        let header = self.state.get().header_top_offset;
        if header == 0.0 {
            ToolbarPosition::Shown
        } else if header <= -self.options.header_height {
            ToolbarPosition::Hidden
        } else {
            ToolbarPosition::Transitioning
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.borrow().is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.surface().is_some() && self.toolbar.strong_count() > 0
    }

    /// Earliest deadline among pending deferred callbacks and the active animation.
    ///
    /// Adapters without a frame clock can sleep until this instant before calling `tick`.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        let timer = self.timers.borrow().next_deadline_ms();
        let animation = self
            .animation
            .borrow()
            .as_ref()
            .map(|a| a.tween.start_ms.saturating_add(a.tween.duration_ms));
        match (timer, animation) {
            (Some(t), Some(a)) => Some(t.min(a)),
            (t, a) => t.or(a),
        }
    }

    /// Attaches a new content surface and resets to the shown state.
    ///
    /// Pending deferred callbacks are cancelled and an in-flight animation completes with
    /// `false`.
    pub fn attach<S: ContentSurface + 'static>(&self, surface: &Rc<S>) {
        let surface = Rc::downgrade(surface);
        let surface: Weak<dyn ContentSurface> = surface;
        tdebug!("ToolbarVisibilityController::attach");
        self.teardown();
        *self.surface.borrow_mut() = Some(surface);
        self.reset_to_shown();
    }

    /// Detaches the content surface. Later events are ignored until the next `attach`.
    pub fn detach(&self) {
        tdebug!("ToolbarVisibilityController::detach");
        *self.surface.borrow_mut() = None;
        self.teardown();
    }

    /// Incremental finger movement while dragging. Positive values pull the content down
    /// (toward revealing the toolbars), negative values push it up (toward hiding them).
    pub fn on_drag_update(&self, delta_y: f32) {
        let Some((surface, toolbar)) = self.collaborators() else {
            return;
        };
        if !delta_y.is_finite() {
            ttrace!(delta_y, "on_drag_update: ignoring non-finite delta");
            return;
        }
        if self.guards.get().is_zooming || surface.snapshot().is_zooming {
            ttrace!("on_drag_update: zooming");
            return;
        }

        // Direct manipulation takes over from any running reveal.
        self.finish_animation(&*toolbar, false);
        self.dragging.set(true);

        let h = self.options.header_height;
        let mut state = self.state.get();
        state.translation = (state.translation + delta_y).clamp(-h, h);
        self.state.set(state);

        let header_dy =
            (state.header_top_offset + state.translation).clamp(-h, 0.0) - state.header_top_offset;
        toolbar.set_transform(header_dy, self.options.footer_for_header(header_dy));
    }

    pub fn on_drag_end(&self, will_decelerate: bool) {
        let Some((_, toolbar)) = self.collaborators() else {
            return;
        };
        self.dragging.set(false);
        if will_decelerate {
            ttrace!("on_drag_end: deferring commit to deceleration end");
            return;
        }
        self.commit_translation(&*toolbar);
    }

    pub fn on_deceleration_end(&self) {
        let Some((_, toolbar)) = self.collaborators() else {
            return;
        };
        if self.dragging.get() {
            ttrace!("on_deceleration_end: stale, a new drag is in progress");
            return;
        }
        self.commit_translation(&*toolbar);
    }

    /// Forces the toolbars to the shown state.
    ///
    /// `due_to_tap` scrolls the content by one toolbar height so the revealed footer does not
    /// cover what the user tapped. The animation duration scales with the remaining travel.
    pub fn show_toolbars(
        &self,
        animated: bool,
        due_to_tap: bool,
        now_ms: u64,
        completion: Option<Completion>,
    ) {
        let Some((surface, toolbar)) = self.collaborators() else {
            return;
        };
        // The inset update below may call back into a nested reveal; the outer one does the work.
        let Some(_reentry) = ReentryGuard::enter(&self.in_reveal) else {
            ttrace!("show_toolbars: dropping re-entrant reveal");
            self.bump(|s| s.reentrant_drops += 1);
            if let Some(completion) = completion {
                completion(false);
            }
            return;
        };

        self.adjust_insets_for_content_height(now_ms);

        let state = self.state.get();
        if state.translation == 0.0 && state.header_top_offset == 0.0 && !self.is_animating() {
            if let Some(completion) = completion {
                completion(true);
            }
            return;
        }

        self.commit_translation(&*toolbar);

        let remaining = (self.state.get().header_top_offset / self.options.header_height).abs();
        let duration_ms = (self.options.base_animation_ms as f32 * remaining) as u64;
        tdebug!(animated, due_to_tap, duration_ms, "show_toolbars");

        self.nudge_content_for_reveal(&*surface, due_to_tap);

        if !animated || duration_ms == 0 {
            let superseded = self.animation.borrow_mut().take();
            self.apply_offsets(&*toolbar, 0.0);
            if let Some(previous) = superseded.and_then(|a| a.completion) {
                previous(false);
            }
            if let Some(completion) = completion {
                completion(true);
            }
            return;
        }

        let from = self.state.get().header_top_offset;
        let superseded = {
            let mut slot = self.animation.borrow_mut();
            match slot.as_mut() {
                Some(anim) => {
                    anim.tween.retarget(now_ms, 0.0, duration_ms);
                    core::mem::replace(&mut anim.completion, completion)
                }
                None => {
                    let tween = Tween::new(from, 0.0, now_ms, duration_ms, self.options.easing);
                    *slot = Some(Animation { tween, completion });
                    None
                }
            }
        };
        if let Some(previous) = superseded {
            previous(false);
        }
    }

    /// Reacts to a content-size change reported by the surface.
    ///
    /// Nested notifications raised while this handler runs are dropped.
    pub fn on_content_size_changed(&self, now_ms: u64) {
        let Some((surface, _)) = self.collaborators() else {
            return;
        };
        let Some(_reentry) = ReentryGuard::enter(&self.in_content_size_change) else {
            ttrace!("on_content_size_changed: dropping re-entrant notification");
            self.bump(|s| s.reentrant_drops += 1);
            return;
        };

        self.reschedule(
            Deferred::ContentSizeRecheck,
            now_ms,
            self.options.content_size_recheck_ms,
        );

        let snapshot = surface.snapshot();
        if !snapshot.is_tall_enough_to_scroll(self.options.footer_height)
            && !self.toolbars_showing()
        {
            tdebug!(
                content_height = snapshot.content_height,
                "on_content_size_changed: page too short to scroll, revealing toolbars"
            );
            self.show_toolbars(true, false, now_ms, None);
        }
    }

    pub fn on_zoom_start(&self, now_ms: u64) {
        if !self.is_attached() {
            return;
        }
        self.update_guards(|g| g.is_zooming = true);
        if let Some(watchdog_ms) = self.options.zoom_watchdog_ms {
            self.reschedule(Deferred::ZoomWatchdog, now_ms, watchdog_ms);
        }
    }

    pub fn on_zoom_end(&self, now_ms: u64) {
        if !self.is_attached() {
            return;
        }
        self.update_guards(|g| g.is_zooming = false);
        self.cancel_pending(Deferred::ZoomWatchdog);
        self.adjust_insets_for_content_height(now_ms);
    }

    /// Applies content insets for the current page height and keyboard state.
    ///
    /// Suppressed while zooming. While the page is loading a single re-check is deferred; the
    /// re-check keeps deferring until loading finishes.
    pub fn adjust_insets_for_content_height(&self, now_ms: u64) {
        let Some((surface, _)) = self.collaborators() else {
            return;
        };
        let guards = self.guards.get();
        if guards.is_zooming {
            ttrace!("adjust_insets_for_content_height: suppressed while zooming");
            return;
        }

        let snapshot = surface.snapshot();
        if snapshot.is_loading {
            if guards.is_adjusting_insets {
                return;
            }
            self.update_guards(|g| g.is_adjusting_insets = true);
            self.reschedule(Deferred::LoadRecheck, now_ms, self.options.load_recheck_ms);
            return;
        }

        self.cancel_pending(Deferred::LoadRecheck);
        self.update_guards(|g| g.is_adjusting_insets = false);

        let insets = self.insets_for(&snapshot, guards.keyboard_visible);
        if self.last_insets.replace(Some(insets)) == Some(insets) {
            return;
        }
        ttrace!(top = insets.top, bottom = insets.bottom, "applying insets");
        surface.set_insets(insets);
    }

    pub fn on_keyboard_will_show(&self) {
        if !self.is_attached() {
            return;
        }
        self.update_guards(|g| g.keyboard_visible = true);
        self.cancel_pending(Deferred::KeyboardSettle);
    }

    pub fn on_keyboard_did_show(&self, now_ms: u64) {
        self.adjust_insets_for_content_height(now_ms);
    }

    /// Schedules a re-commit to the nearest stable state once the keyboard has settled.
    pub fn on_keyboard_will_hide(&self, now_ms: u64) {
        if !self.is_attached() {
            return;
        }
        self.update_guards(|g| g.keyboard_visible = false);
        self.reschedule(
            Deferred::KeyboardSettle,
            now_ms,
            self.options.keyboard_settle_ms,
        );
    }

    /// Reveals hidden toolbars when the tap lands in the bottom toolbar band.
    ///
    /// Returns `true` if the tap triggered a reveal.
    pub fn on_tap_in_dead_zone(&self, tap_y: f32, surface_height: f32, now_ms: u64) -> bool {
        if !self.is_attached() || !self.options.footer_docked {
            return false;
        }
        if self.toolbars_showing() || self.is_animating() {
            return false;
        }
        let in_footer_band = tap_y > surface_height - self.options.footer_height;
        if !in_footer_band {
            return false;
        }
        self.show_toolbars(true, true, now_ms, None);
        true
    }

    pub fn on_page_unload(&self, now_ms: u64) {
        if !self.is_attached() {
            return;
        }
        self.reschedule(
            Deferred::PageUnloadReveal,
            now_ms,
            self.options.page_unload_reveal_ms,
        );
    }

    /// Shows the toolbars and lets the surface proceed with its scroll-to-top.
    ///
    /// Returns `false` when detached.
    pub fn on_scroll_to_top(&self, now_ms: u64) -> bool {
        if !self.is_attached() {
            return false;
        }
        self.show_toolbars(true, false, now_ms, None);
        true
    }

    pub fn on_top_area_tapped(&self, now_ms: u64) {
        self.show_toolbars(true, false, now_ms, None);
    }

    /// Advances the controller.
    ///
    /// - Runs deferred callbacks that are due, in deadline order. Callbacks scheduled during
    ///   this call wait for the next `tick`.
    /// - If a show animation is active, updates the offsets and returns the header offset.
    pub fn tick(&self, now_ms: u64) -> Option<f32> {
        if !self.is_attached() {
            self.teardown();
            return None;
        }

        let watermark = self.timers.borrow().watermark();
        loop {
            let due = self
                .timers
                .borrow_mut()
                .pop_due_before(now_ms, watermark);
            let Some((id, task)) = due else {
                break;
            };
            self.forget_pending(task, id);
            self.bump(|s| s.deferred_runs += 1);
            self.run_deferred(task, now_ms);
        }

        self.advance_animation(now_ms)
    }

    fn run_deferred(&self, task: Deferred, now_ms: u64) {
        ttrace!(?task, now_ms, "running deferred callback");
        match task {
            Deferred::LoadRecheck => {
                self.update_guards(|g| g.is_adjusting_insets = false);
                self.adjust_insets_for_content_height(now_ms);
            }
            Deferred::ContentSizeRecheck => self.adjust_insets_for_content_height(now_ms),
            Deferred::KeyboardSettle => self.settle_after_keyboard_hide(),
            Deferred::PageUnloadReveal => self.show_toolbars(true, false, now_ms, None),
            Deferred::ZoomWatchdog => {
                if !self.guards.get().is_zooming {
                    return;
                }
                twarn!("zoom end never arrived, releasing zoom guard");
                self.update_guards(|g| g.is_zooming = false);
                self.bump(|s| s.watchdog_releases += 1);
                self.adjust_insets_for_content_height(now_ms);
            }
        }
    }

    fn settle_after_keyboard_hide(&self) {
        let Some((_, toolbar)) = self.collaborators() else {
            return;
        };
        // The keyboard came back or the user is mid-drag: nothing to settle.
        if self.guards.get().keyboard_visible || self.dragging.get() {
            return;
        }

        self.finish_animation(&*toolbar, false);

        let mut state = self.state.get();
        state.translation = 0.0;
        self.state.set(state);
        toolbar.set_transform(0.0, 0.0);

        let header = if state.header_top_offset < 0.0 {
            -self.options.header_height
        } else {
            0.0
        };
        self.apply_offsets(&*toolbar, header);
    }

    /// Snaps the drag translation to one of the two stable states.
    ///
    /// Revealing requires the translation to strictly exceed the hidden threshold.
    fn commit_translation(&self, toolbar: &dyn ToolbarView) {
        let mut state = self.state.get();
        let target = if state.translation < 0.0 && state.header_top_offset == 0.0 {
            Some(-self.options.header_height)
        } else if state.translation > self.options.hidden_threshold()
            && state.header_top_offset != 0.0
        {
            Some(0.0)
        } else {
            None
        };

        state.translation = 0.0;
        self.state.set(state);
        toolbar.set_transform(0.0, 0.0);

        if let Some(header) = target {
            tdebug!(header, "committing toolbar position");
            self.bump(|s| s.commits += 1);
            self.apply_offsets(toolbar, header);
        }
    }

    fn advance_animation(&self, now_ms: u64) -> Option<f32> {
        let toolbar = self.toolbar.upgrade()?;
        let (offset, done) = {
            let slot = self.animation.borrow();
            let anim = slot.as_ref()?;
            (anim.tween.sample(now_ms), anim.tween.is_done(now_ms))
        };

        self.apply_offsets(&*toolbar, offset);

        if done {
            let finished = self.animation.borrow_mut().take();
            if let Some(completion) = finished.and_then(|a| a.completion) {
                completion(true);
            }
        }
        Some(offset)
    }

    /// Jumps an in-flight animation to its target.
    fn finish_animation(&self, toolbar: &dyn ToolbarView, finished: bool) {
        let Some(anim) = self.animation.borrow_mut().take() else {
            return;
        };
        self.apply_offsets(toolbar, anim.tween.to);
        if let Some(completion) = anim.completion {
            completion(finished);
        }
    }

    fn nudge_content_for_reveal(&self, surface: &dyn ContentSurface, due_to_tap: bool) {
        let y = surface.snapshot().content_offset_y;
        if due_to_tap {
            surface.set_content_offset_y(y + self.options.footer_height);
        } else if y > self.options.header_height {
            // Keep the page visually in place while the header slides back in.
            surface.set_content_offset_y(y + self.options.header_height);
        }
    }

    fn insets_for(&self, snapshot: &ScrollSnapshot, keyboard_visible: bool) -> Insets {
        let tall = snapshot.is_tall_enough_to_scroll(self.options.footer_height);
        let bottom = if !tall && !keyboard_visible && !self.options.footer_docked {
            0.0
        } else {
            self.options.footer_height
        };
        Insets {
            top: self.options.header_height,
            bottom,
        }
    }

    /// Writes a header offset, its mirrored footer offset and the matching content alpha.
    fn apply_offsets(&self, toolbar: &dyn ToolbarView, header_top_offset: f32) {
        let h = self.options.header_height;
        let header = header_top_offset.clamp(-h, 0.0);
        let footer = self.options.footer_for_header(header);
        let mut state = self.state.get();
        state.header_top_offset = header;
        state.footer_bottom_offset = footer;
        self.state.set(state);
        toolbar.set_offsets(header, footer);
        toolbar.set_content_alpha((1.0 + header / h).clamp(0.0, 1.0));
    }

    fn reset_to_shown(&self) {
        self.state.set(ToolbarState::default());
        self.guards.set(GuardFlags::default());
        self.dragging.set(false);
        self.last_insets.set(None);
        if let Some(toolbar) = self.toolbar.upgrade() {
            toolbar.set_transform(0.0, 0.0);
            self.apply_offsets(&*toolbar, 0.0);
        }
    }

    /// Cancels deferred callbacks and interrupts any animation.
    fn teardown(&self) {
        self.timers.borrow_mut().clear();
        self.pending.set(PendingTimers::default());
        let interrupted = self.animation.borrow_mut().take();
        if let Some(completion) = interrupted.and_then(|a| a.completion) {
            completion(false);
        }
    }

    fn reschedule(&self, task: Deferred, now_ms: u64, delay_ms: u64) {
        let mut pending = self.pending.get();
        let slot = pending.slot_mut(task);
        {
            let mut timers = self.timers.borrow_mut();
            if let Some(id) = slot.take() {
                timers.cancel(id);
            }
            *slot = Some(timers.schedule(now_ms, delay_ms, task));
        }
        self.pending.set(pending);
    }

    fn cancel_pending(&self, task: Deferred) {
        let mut pending = self.pending.get();
        if let Some(id) = pending.slot_mut(task).take() {
            self.timers.borrow_mut().cancel(id);
        }
        self.pending.set(pending);
    }

    fn forget_pending(&self, task: Deferred, id: TimerId) {
        let mut pending = self.pending.get();
        let slot = pending.slot_mut(task);
        if *slot == Some(id) {
            *slot = None;
        }
        self.pending.set(pending);
    }

    fn surface(&self) -> Option<Rc<dyn ContentSurface>> {
        self.surface.borrow().as_ref()?.upgrade()
    }

    fn collaborators(&self) -> Option<(Rc<dyn ContentSurface>, Rc<dyn ToolbarView>)> {
        Some((self.surface()?, self.toolbar.upgrade()?))
    }

    fn update_guards(&self, f: impl FnOnce(&mut GuardFlags)) {
        let mut guards = self.guards.get();
        f(&mut guards);
        self.guards.set(guards);
    }

    fn bump(&self, f: impl FnOnce(&mut ControllerStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}
