//! Lifecycle handlers for one grid chart cell, independent of the DOM.
//!
//! `receive_props` is the on-props-changed hook, the debounced resize is the
//! on-timer-fire hook and `teardown` is the unmount hook. The Leptos component
//! drives these from effects and `on_cleanup`.

use super::layout::{Dimensions, LayoutState};
use super::resize_debounce::{ResizeDebouncer, TimerHost};
use super::update_gate::{should_update, ChartProps, UpdateDecision};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct GridChartCell<H: TimerHost> {
    props: Rc<RefCell<ChartProps>>,
    layout: Rc<Cell<LayoutState>>,
    on_layout: Rc<dyn Fn(LayoutState)>,
    debouncer: ResizeDebouncer<H>,
}

impl<H: TimerHost> GridChartCell<H> {
    /// `on_layout` is invoked with the new layout whenever a debounced resize
    /// changes it; that is the cell's signal to re-render.
    pub fn new(
        host: H,
        debounce_ms: u32,
        initial: ChartProps,
        on_layout: impl Fn(LayoutState) + 'static,
    ) -> Self {
        let layout = LayoutState::new(initial.dimensions());
        Self {
            props: Rc::new(RefCell::new(initial)),
            layout: Rc::new(Cell::new(layout)),
            on_layout: Rc::new(on_layout),
            debouncer: ResizeDebouncer::new(host, debounce_ms),
        }
    }

    pub fn layout(&self) -> LayoutState {
        self.layout.get()
    }

    pub fn is_resize_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Records the new props and decides whether the cell re-renders.
    ///
    /// The props are stored even when the answer is not `Render`, so a later
    /// resize reads the latest width/height.
    pub fn receive_props(&self, next: ChartProps) -> UpdateDecision {
        if self.debouncer.is_torn_down() {
            return UpdateDecision::Skip;
        }
        let prev = self.props.replace(next);
        let layout = self.layout.get();
        let decision = should_update(&prev, &self.props.borrow(), layout, layout);

        if decision == UpdateDecision::ScheduleResize {
            let props = Rc::clone(&self.props);
            let layout = Rc::clone(&self.layout);
            let on_layout = Rc::clone(&self.on_layout);
            self.debouncer.restart(move || {
                let current = props.borrow().clone();
                apply_resize(&current, &layout, on_layout.as_ref(), current.dimensions());
            });
        }
        decision
    }

    pub fn teardown(&self) {
        self.debouncer.teardown();
    }
}

fn apply_resize(
    props: &ChartProps,
    layout: &Cell<LayoutState>,
    on_layout: &dyn Fn(LayoutState),
    dims: Dimensions,
) {
    let prev = layout.get();
    let next = prev.resized(dims);
    if should_update(props, props, prev, next) == UpdateDecision::Render {
        layout.set(next);
        on_layout(next);
    }
}

#[cfg(test)]
mod tests {
    use super::super::resize_debounce::testing::ManualClock;
    use super::super::update_gate::fixtures::props;
    use super::*;

    struct Harness {
        clock: ManualClock,
        cell: GridChartCell<ManualClock>,
        renders: Rc<RefCell<Vec<(u64, LayoutState)>>>,
    }

    fn harness() -> Harness {
        let clock = ManualClock::default();
        let renders = Rc::new(RefCell::new(Vec::new()));
        let r = Rc::clone(&renders);
        let c = clock.clone();
        let cell = GridChartCell::new(clock.clone(), 350, props(), move |layout| {
            r.borrow_mut().push((c.now(), layout));
        });
        Harness {
            clock,
            cell,
            renders,
        }
    }

    fn sized(width: f64, height: f64) -> ChartProps {
        let mut p = props();
        p.width = width;
        p.height = height;
        p
    }

    #[test]
    fn test_burst_applies_last_dimensions_once() {
        let h = harness();

        assert_eq!(h.cell.receive_props(sized(410.0, 300.0)), UpdateDecision::ScheduleResize);
        h.clock.advance(100);
        assert_eq!(h.cell.receive_props(sized(420.0, 310.0)), UpdateDecision::ScheduleResize);
        h.clock.advance(200);
        assert_eq!(h.cell.receive_props(sized(430.0, 320.0)), UpdateDecision::ScheduleResize);

        h.clock.advance(349);
        assert!(h.renders.borrow().is_empty());
        assert_eq!(h.cell.layout().width, 400.0);

        h.clock.advance(1);
        let renders = h.renders.borrow();
        assert_eq!(renders.len(), 1);
        assert_eq!(renders[0].0, 650);
        assert_eq!(renders[0].1.width, 430.0);
        assert_eq!(renders[0].1.height, 320.0);
        drop(renders);

        h.clock.advance(5000);
        assert_eq!(h.renders.borrow().len(), 1);
    }

    #[test]
    fn test_resize_back_to_original_does_not_render() {
        let h = harness();
        h.cell.receive_props(sized(500.0, 300.0));
        h.cell.receive_props(sized(400.0, 300.0));
        // second snapshot differs from the first, so the timer restarts
        assert!(h.cell.is_resize_pending());

        h.clock.advance(350);
        assert!(h.renders.borrow().is_empty());
        assert_eq!(h.cell.layout().width, 400.0);
    }

    #[test]
    fn test_timer_reads_latest_props_at_fire_time() {
        let h = harness();
        h.cell.receive_props(sized(500.0, 300.0));

        // a watched change arriving with new dimensions renders immediately
        // and does not restart the timer
        let mut next = sized(600.0, 300.0);
        next.is_expanded = true;
        assert_eq!(h.cell.receive_props(next), UpdateDecision::Render);

        h.clock.advance(350);
        assert_eq!(h.cell.layout().width, 600.0);
        assert_eq!(h.renders.borrow().len(), 1);
    }

    #[test]
    fn test_teardown_with_pending_resize_never_mutates() {
        let h = harness();
        h.cell.receive_props(sized(800.0, 600.0));
        assert!(h.cell.is_resize_pending());

        h.cell.teardown();
        h.clock.advance(1000);

        assert!(h.renders.borrow().is_empty());
        assert_eq!(h.cell.layout().width, 400.0);
        assert_eq!(h.cell.receive_props(sized(900.0, 600.0)), UpdateDecision::Skip);
        h.clock.advance(1000);
        assert!(h.renders.borrow().is_empty());
    }

    #[test]
    fn test_non_watched_noop_update_skips() {
        let h = harness();
        assert_eq!(h.cell.receive_props(props()), UpdateDecision::Skip);
        assert!(!h.cell.is_resize_pending());
    }
}
