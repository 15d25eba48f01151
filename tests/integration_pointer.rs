use std::time::Duration;

use dock_wm::input::{ButtonMask, HitTarget, HostEvent, PointerEvent};
use dock_wm::layout::{Bounds, Viewport};
use dock_wm::window::ManagementState;
use dock_wm::window::config::{Dimension, Position, WindowConfig};
use dock_wm::window::surface::{HeadlessSurface, SurfacePart};
use dock_wm::window::transition::Transition;
use dock_wm::{WindowEvent, WindowId, WindowManager, WindowState};

fn manager() -> WindowManager<HeadlessSurface> {
    WindowManager::new(HeadlessSurface::default(), Viewport::new(1000.0, 800.0))
}

fn open_at(wm: &mut WindowManager<HeadlessSurface>, x: f64, y: f64) -> WindowId {
    wm.create(
        WindowConfig::new("w")
            .with_position(Position::Pixels(x), Position::Pixels(y))
            .with_size(Dimension::Pixels(300.0), Dimension::Pixels(200.0)),
    )
    .unwrap()
}

fn settle(wm: &mut WindowManager<HeadlessSurface>) {
    let later = wm.now() + Duration::from_millis(300);
    wm.tick(later);
}

fn hit(wm: &WindowManager<HeadlessSurface>, id: WindowId, part: SurfacePart) -> Option<HitTarget> {
    Some(HitTarget::new(wm.window(id).unwrap().surface(), part))
}

fn docked(wm: &mut WindowManager<HeadlessSurface>) -> WindowId {
    let id = open_at(wm, 100.0, 100.0);
    wm.minimize(id).unwrap();
    settle(wm);
    assert_eq!(wm.dock().get(&1), Some(&id));
    wm.take_events();
    id
}

fn undock_count(events: &[WindowEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, WindowEvent::Undocked(_)))
        .count()
}

#[test]
fn title_bar_drag_moves_normal_window() {
    let mut wm = manager();
    let id = open_at(&mut wm, 100.0, 100.0);
    let target = hit(&wm, id, SurfacePart::TitleBar);

    assert!(wm.handle_event(&PointerEvent::down(150.0, 105.0, target).into()));
    assert!(wm.is_dragging());
    wm.handle_event(&PointerEvent::moved(190.0, 125.0, ButtonMask::PRIMARY).into());
    wm.handle_event(&PointerEvent::up(190.0, 125.0, target).into());

    assert!(!wm.is_dragging());
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Normal);
    assert_eq!(window.bounds(), Bounds::new(140.0, 120.0, 300.0, 200.0));
    assert_eq!(window.restore_position(), window.bounds());
}

#[test]
fn drag_cannot_lift_title_bar_above_viewport() {
    let mut wm = manager();
    let id = open_at(&mut wm, 100.0, 100.0);
    let target = hit(&wm, id, SurfacePart::TitleBar);
    wm.handle_event(&PointerEvent::down(150.0, 105.0, target).into());
    wm.handle_event(&PointerEvent::moved(150.0, -200.0, ButtonMask::PRIMARY).into());
    assert_eq!(wm.window(id).unwrap().bounds().top, 0.0);
}

#[test]
fn releasing_the_button_mid_move_ends_the_drag() {
    let mut wm = manager();
    let id = open_at(&mut wm, 100.0, 100.0);
    let target = hit(&wm, id, SurfacePart::TitleBar);
    wm.handle_event(&PointerEvent::down(150.0, 105.0, target).into());
    wm.handle_event(&PointerEvent::moved(170.0, 105.0, ButtonMask::NONE).into());
    assert!(!wm.is_dragging());
    wm.handle_event(&PointerEvent::moved(400.0, 400.0, ButtonMask::PRIMARY).into());
    assert_eq!(wm.window(id).unwrap().bounds().left, 100.0);
}

#[test]
fn small_drag_keeps_tile_docked() {
    let mut wm = manager();
    let id = docked(&mut wm);
    let cell = wm.window(id).unwrap().dock_slot();
    let target = hit(&wm, id, SurfacePart::TitleBar);

    wm.handle_event(&PointerEvent::down(10.0, 770.0, target).into());
    wm.handle_event(&PointerEvent::moved(13.0, 773.0, ButtonMask::PRIMARY).into());
    wm.handle_event(&PointerEvent::moved(14.0, 770.0, ButtonMask::PRIMARY).into());
    wm.handle_event(&PointerEvent::up(14.0, 770.0, target).into());

    let window = wm.window(id).unwrap();
    assert_eq!(window.management_state(), ManagementState::Managed);
    assert_eq!(window.dock_slot(), cell);
    assert_eq!(wm.dock().get(&1), Some(&id));
    assert_eq!(undock_count(&wm.take_events()), 0);
}

#[test]
fn long_drag_undocks_once_and_sticks() {
    let mut wm = manager();
    let id = docked(&mut wm);
    let target = hit(&wm, id, SurfacePart::TitleBar);

    wm.handle_event(&PointerEvent::down(10.0, 770.0, target).into());
    wm.handle_event(&PointerEvent::moved(16.0, 770.0, ButtonMask::PRIMARY).into());
    assert_eq!(
        wm.window(id).unwrap().management_state(),
        ManagementState::Unmanaged
    );
    assert!(wm.window(id).unwrap().drag_flag());
    assert!(wm.dock().is_empty());
    assert_eq!(
        wm.window(id).unwrap().tray_position(),
        Some(Bounds::new(6.0, 760.0, 170.0, 40.0))
    );

    wm.handle_event(&PointerEvent::moved(40.0, 700.0, ButtonMask::PRIMARY).into());
    wm.handle_event(&PointerEvent::up(40.0, 700.0, target).into());
    assert_eq!(undock_count(&wm.take_events()), 1);
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Minimized);
    assert_eq!(window.visible_bounds(), Bounds::new(30.0, 690.0, 170.0, 40.0));
    let view = wm.surface().view(window.surface()).unwrap();
    assert_eq!(view.bounds, Bounds::new(30.0, 690.0, 170.0, 40.0));

    // The restore opens where the tile was left, and the window stays
    // out of the dock for its next minimize too.
    wm.restore(id).unwrap();
    settle(&mut wm);
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Normal);
    assert_eq!(window.bounds().left, 30.0);
    assert_eq!(window.management_state(), ManagementState::Unmanaged);
    assert!(!window.drag_flag());

    wm.minimize(id).unwrap();
    settle(&mut wm);
    assert!(wm.dock().is_empty());
    assert_eq!(
        wm.window(id).unwrap().visible_bounds(),
        Bounds::new(30.0, 690.0, 170.0, 40.0)
    );
    assert_eq!(undock_count(&wm.take_events()), 0);
}

#[test]
fn undocking_one_tile_reflows_the_rest() {
    let mut wm = manager();
    let first = docked(&mut wm);
    let second = open_at(&mut wm, 200.0, 200.0);
    wm.minimize(second).unwrap();
    settle(&mut wm);
    assert_eq!(wm.window(second).unwrap().dock_slot().unwrap().x, 136.0);

    let target = hit(&wm, first, SurfacePart::TitleBar);
    wm.handle_event(&PointerEvent::down(10.0, 770.0, target).into());
    wm.handle_event(&PointerEvent::moved(10.0, 700.0, ButtonMask::PRIMARY).into());

    assert_eq!(wm.dock().len(), 1);
    assert_eq!(wm.dock().get(&1), Some(&second));
    assert_eq!(wm.window(second).unwrap().dock_slot().unwrap().x, 0.0);
}

#[test]
fn double_click_restores_a_tile() {
    let mut wm = manager();
    let id = docked(&mut wm);
    let target = hit(&wm, id, SurfacePart::Body);

    wm.handle_event(&PointerEvent::down(10.0, 790.0, target).into());
    wm.handle_event(&PointerEvent::up(10.0, 790.0, target).into());
    assert_eq!(wm.window(id).unwrap().state(), WindowState::Minimized);
    wm.handle_event(&PointerEvent::down(10.0, 790.0, target).into());
    assert_eq!(wm.window(id).unwrap().state(), WindowState::Animating);

    settle(&mut wm);
    assert_eq!(wm.window(id).unwrap().state(), WindowState::Normal);
    assert_eq!(wm.focused(), Some(id));
}

#[test]
fn slow_second_click_does_not_restore() {
    let mut wm = manager();
    let id = docked(&mut wm);
    let target = hit(&wm, id, SurfacePart::Body);

    wm.handle_event(&PointerEvent::down(10.0, 790.0, target).into());
    let later = wm.now() + Duration::from_secs(2);
    wm.tick(later);
    wm.handle_event(&PointerEvent::down(10.0, 790.0, target).into());
    assert_eq!(wm.window(id).unwrap().state(), WindowState::Minimized);
}

#[test]
fn chrome_buttons_minimize_and_close() {
    let mut wm = manager();
    let a = open_at(&mut wm, 0.0, 0.0);
    let b = open_at(&mut wm, 50.0, 50.0);

    wm.handle_event(&PointerEvent::down(0.0, 0.0, hit(&wm, a, SurfacePart::MinimizeButton)).into());
    assert_eq!(wm.window(a).unwrap().state(), WindowState::Animating);
    settle(&mut wm);
    assert_eq!(wm.window(a).unwrap().state(), WindowState::Minimized);
    assert_eq!(wm.focused(), Some(b));

    wm.handle_event(&PointerEvent::down(0.0, 0.0, hit(&wm, b, SurfacePart::CloseButton)).into());
    assert!(wm.window(b).is_none());
    assert_eq!(wm.focused(), None);
}

#[test]
fn clicks_and_focus_events_route_focus() {
    let mut wm = manager();
    let a = open_at(&mut wm, 0.0, 0.0);
    let b = open_at(&mut wm, 50.0, 50.0);
    assert_eq!(wm.focused(), Some(b));

    wm.handle_event(&PointerEvent::down(10.0, 30.0, hit(&wm, a, SurfacePart::Body)).into());
    assert_eq!(wm.focused(), Some(a));
    assert_eq!(wm.stacking_order().last(), Some(&a));

    // Releasing over empty space drops focus.
    wm.handle_event(&PointerEvent::up(900.0, 700.0, None).into());
    assert_eq!(wm.focused(), None);

    let handle = wm.window(b).unwrap().surface();
    wm.handle_event(&HostEvent::FocusIn(Some(handle)));
    assert_eq!(wm.focused(), Some(b));
    wm.handle_event(&HostEvent::FocusIn(None));
    assert_eq!(wm.focused(), None);
}

#[test]
fn host_resize_reaches_the_manager() {
    let mut wm = manager();
    wm.handle_event(&HostEvent::Resize {
        width: 640.0,
        height: 480.0,
    });
    assert_eq!(wm.viewport(), Viewport::new(640.0, 480.0));
    assert_eq!(wm.tile_geometry().slots_per_row, 7);
}

#[test]
fn queued_restore_runs_after_minimize_commits() {
    let mut wm = manager();
    let id = open_at(&mut wm, 100.0, 100.0);
    let t0 = wm.now();
    assert_eq!(wm.minimize(id), Ok(Transition::Started));
    assert_eq!(wm.restore(id), Ok(Transition::Queued));
    assert_eq!(wm.window(id).unwrap().queued_requests().count(), 1);

    wm.tick(t0 + Duration::from_millis(250));
    assert_eq!(wm.window(id).unwrap().state(), WindowState::Animating);
    assert!(wm.dock().is_empty());

    wm.tick(t0 + Duration::from_millis(500));
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Normal);
    assert_eq!(window.bounds(), Bounds::new(100.0, 100.0, 300.0, 200.0));
    let events: Vec<_> = wm
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, WindowEvent::Minimized(_) | WindowEvent::Restored(_)))
        .collect();
    assert_eq!(events, vec![WindowEvent::Minimized(id), WindowEvent::Restored(id)]);
}

#[test]
fn stale_queued_call_is_rejected() {
    let mut wm = manager();
    let id = open_at(&mut wm, 100.0, 100.0);
    wm.minimize(id).unwrap();
    assert_eq!(wm.minimize(id), Ok(Transition::Queued));
    settle(&mut wm);

    assert_eq!(wm.window(id).unwrap().state(), WindowState::Minimized);
    let rejected: Vec<_> = wm
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, WindowEvent::Rejected { .. }))
        .collect();
    assert_eq!(rejected.len(), 1);
    assert!(matches!(
        &rejected[0],
        WindowEvent::Rejected {
            id: rejected_id,
            error: dock_wm::WmError::InvalidState { op: "minimize", .. },
        } if *rejected_id == id
    ));
}
