use std::time::Duration;

use dock_wm::input::HostEvent;
use dock_wm::layout::{Bounds, Viewport};
use dock_wm::window::config::{Dimension, Position, WindowConfig};
use dock_wm::window::surface::HeadlessSurface;
use dock_wm::window::ManagementState;
use dock_wm::{WindowEvent, WindowId, WindowManager, WindowState};

fn manager(width: f64, height: f64) -> WindowManager<HeadlessSurface> {
    WindowManager::new(HeadlessSurface::default(), Viewport::new(width, height))
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

#[test]
fn three_tiles_share_the_bottom_row() {
    let mut wm = manager(1000.0, 800.0);
    let ids: Vec<_> = (0..3).map(|i| open_at(&mut wm, 50.0 * i as f64, 40.0)).collect();

    for id in &ids {
        wm.minimize(*id).unwrap();
    }
    settle(&mut wm);

    let geometry = wm.tile_geometry();
    assert_eq!(geometry.tile_width, 170.0);
    assert_eq!(geometry.slots_per_row, 7);
    assert_eq!(geometry.row_count, 1);

    let slots: Vec<_> = wm.dock().iter().map(|(slot, id)| (*slot, *id)).collect();
    assert_eq!(slots, vec![(1, ids[0]), (2, ids[1]), (3, ids[2])]);
    let xs: Vec<f64> = ids
        .iter()
        .map(|id| wm.window(*id).unwrap().dock_slot().unwrap().x)
        .collect();
    assert_eq!(xs, vec![0.0, 136.0, 272.0]);
    for id in &ids {
        let window = wm.window(*id).unwrap();
        assert_eq!(window.state(), WindowState::Minimized);
        let cell = window.dock_slot().unwrap();
        assert_eq!(cell.y, 760.0);
        assert_eq!(wm.surface().view(window.surface()).unwrap().bounds, cell.bounds());
    }
}

#[test]
fn dock_stays_dense_and_excludes_undocked_windows() {
    let mut wm = manager(1000.0, 800.0);
    let ids: Vec<_> = (0..4).map(|i| open_at(&mut wm, 10.0 * i as f64, 10.0)).collect();
    for id in &ids[..3] {
        wm.minimize(*id).unwrap();
        settle(&mut wm);
    }
    assert_eq!(wm.dock().len(), 3);

    wm.restore(ids[1]).unwrap();
    let slots: Vec<_> = wm.dock().iter().map(|(slot, id)| (*slot, *id)).collect();
    assert_eq!(slots, vec![(1, ids[0]), (2, ids[2])]);
    assert_eq!(wm.window(ids[2]).unwrap().dock_slot().unwrap().x, 136.0);
    settle(&mut wm);

    wm.set_management_state(ids[0], ManagementState::Unmanaged);
    let slots: Vec<_> = wm.dock().iter().map(|(slot, id)| (*slot, *id)).collect();
    assert_eq!(slots, vec![(1, ids[2])]);
    assert_eq!(wm.window(ids[2]).unwrap().dock_slot().unwrap().x, 0.0);
    assert_eq!(
        wm.window(ids[0]).unwrap().tray_position(),
        Some(Bounds::new(0.0, 760.0, 170.0, 40.0))
    );

    for id in wm.dock().values() {
        assert!(wm.window(*id).unwrap().is_docked());
    }
    assert!(!wm.dock().values().any(|id| *id == ids[3] || *id == ids[1]));

    wm.set_management_state(ids[0], ManagementState::Managed);
    assert_eq!(wm.dock().len(), 2);
    assert_eq!(wm.dock().get(&2), Some(&ids[0]));
}

#[test]
fn unchanged_tiles_are_not_moved_again() {
    let mut wm = manager(1000.0, 800.0);
    let a = open_at(&mut wm, 0.0, 0.0);
    let b = open_at(&mut wm, 0.0, 0.0);
    wm.minimize(a).unwrap();
    settle(&mut wm);
    let handle = wm.window(a).unwrap().surface();
    let writes = wm.surface().bounds_writes(handle);

    // Focus changes re-run the order pass but leave the tile where it is.
    wm.set_focus(b);
    wm.set_index(b, 1);
    wm.set_focus(b);
    assert_eq!(wm.surface().bounds_writes(handle), writes);
}

#[test]
fn restore_returns_to_captured_position() {
    let mut wm = manager(1000.0, 800.0);
    let id = open_at(&mut wm, 120.0, 80.0);
    wm.minimize(id).unwrap();
    settle(&mut wm);
    assert_eq!(
        wm.window(id).unwrap().restore_position(),
        Bounds::new(120.0, 80.0, 300.0, 200.0)
    );

    wm.restore(id).unwrap();
    settle(&mut wm);
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Normal);
    assert_eq!(window.bounds(), Bounds::new(120.0, 80.0, 300.0, 200.0));
    assert_eq!(window.dock_slot(), None);
    assert_eq!(wm.focused(), Some(id));
    assert!(wm.dock().is_empty());
}

#[test]
fn restore_clamps_into_a_shrunken_viewport() {
    let mut wm = manager(1000.0, 800.0);
    let id = open_at(&mut wm, 600.0, 500.0);
    wm.minimize(id).unwrap();
    settle(&mut wm);

    wm.resize_viewport(700.0, 600.0);
    assert_eq!(wm.window(id).unwrap().dock_slot().unwrap().y, 560.0);

    wm.restore(id).unwrap();
    settle(&mut wm);
    assert_eq!(wm.window(id).unwrap().bounds(), Bounds::new(400.0, 400.0, 300.0, 200.0));
}

#[test]
fn viewport_shrinking_mid_restore_still_lands_on_screen() {
    let mut wm = manager(1000.0, 800.0);
    let id = open_at(&mut wm, 600.0, 500.0);
    wm.minimize(id).unwrap();
    settle(&mut wm);

    wm.restore(id).unwrap();
    wm.resize_viewport(700.0, 600.0);
    settle(&mut wm);

    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Normal);
    assert_eq!(window.bounds(), Bounds::new(400.0, 400.0, 300.0, 200.0));
    assert_eq!(window.restore_position(), window.bounds());
}

#[test]
fn resize_after_the_pane_swap_moves_the_restore_target() {
    let mut wm = manager(1000.0, 800.0);
    let id = open_at(&mut wm, 600.0, 500.0);
    wm.minimize(id).unwrap();
    settle(&mut wm);
    let handle = wm.window(id).unwrap().surface();

    let t0 = wm.now();
    wm.restore(id).unwrap();
    wm.tick(t0 + Duration::from_millis(60));
    assert_eq!(
        wm.surface().view(handle).unwrap().bounds,
        Bounds::new(600.0, 500.0, 300.0, 200.0)
    );

    wm.resize_viewport(700.0, 600.0);
    let target = Bounds::new(400.0, 400.0, 300.0, 200.0);
    assert_eq!(wm.surface().view(handle).unwrap().bounds, target);
    wm.tick(t0 + Duration::from_millis(250));
    assert_eq!(wm.window(id).unwrap().bounds(), target);
}

#[test]
fn viewport_relative_restore_in_flight_takes_the_new_size() {
    let mut wm = manager(1200.0, 800.0);
    let config = WindowConfig::from_specs("0", "0", "50%", "200", "half").unwrap();
    let id = wm.create(config).unwrap();
    wm.minimize(id).unwrap();
    settle(&mut wm);

    wm.restore(id).unwrap();
    wm.resize_viewport(800.0, 800.0);
    settle(&mut wm);
    assert_eq!(wm.window(id).unwrap().bounds(), Bounds::new(0.0, 0.0, 400.0, 200.0));
}

#[test]
fn hidden_viewport_relative_window_shows_at_new_size() {
    let mut wm = manager(1200.0, 800.0);
    let config = WindowConfig::from_specs("0", "0", "50%", "200", "half").unwrap();
    let id = wm.create(config).unwrap();
    wm.hide(id);
    wm.take_events();

    wm.resize_viewport(800.0, 800.0);
    assert_eq!(wm.take_events(), vec![WindowEvent::Resized(id)]);
    wm.show(id);

    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Normal);
    assert_eq!(window.bounds().width, 400.0);
    let view = wm.surface().view(window.surface()).unwrap();
    assert_eq!(view.bounds.width, 400.0);
    assert!(view.visible);
}

#[test]
fn focusing_a_docked_tile_keeps_the_dock_order() {
    let mut wm = manager(1000.0, 800.0);
    let a = open_at(&mut wm, 0.0, 0.0);
    let b = open_at(&mut wm, 10.0, 10.0);
    let c = open_at(&mut wm, 20.0, 20.0);
    wm.minimize(a).unwrap();
    settle(&mut wm);
    assert_eq!(wm.focused(), Some(c));

    let tile = wm.window(a).unwrap().surface();
    wm.handle_event(&HostEvent::FocusIn(Some(tile)));
    assert_eq!(wm.focused(), Some(c));
    assert_eq!(wm.window(a).unwrap().index(), 1);

    wm.minimize(b).unwrap();
    settle(&mut wm);
    let slots: Vec<_> = wm.dock().iter().map(|(slot, id)| (*slot, *id)).collect();
    assert_eq!(slots, vec![(1, a), (2, b)]);

    // Focusing through the API does not lift the tile out of dock order.
    wm.set_focus(a);
    assert_eq!(wm.focused(), Some(a));
    wm.minimize(c).unwrap();
    settle(&mut wm);
    let slots: Vec<_> = wm.dock().iter().map(|(slot, id)| (*slot, *id)).collect();
    assert_eq!(slots, vec![(1, a), (2, b), (3, c)]);
    assert_eq!(wm.window(c).unwrap().dock_slot().unwrap().x, 272.0);
}

#[test]
fn viewport_relative_width_follows_resizes() {
    let mut wm = manager(1200.0, 800.0);
    let config = WindowConfig::from_specs("center", "10", "50%", "300", "half").unwrap();
    let id = wm.create(config).unwrap();
    assert_eq!(wm.window(id).unwrap().bounds().width, 600.0);
    wm.take_events();

    wm.resize_viewport(800.0, 800.0);
    assert_eq!(wm.window(id).unwrap().bounds().width, 400.0);
    assert_eq!(wm.window(id).unwrap().bounds().height, 300.0);
    assert_eq!(wm.take_events(), vec![WindowEvent::Resized(id)]);
}

#[test]
fn viewport_relative_window_restores_at_new_size() {
    let mut wm = manager(1200.0, 800.0);
    let config = WindowConfig::from_specs("0", "0", "50%", "25%", "half").unwrap();
    let id = wm.create(config).unwrap();
    wm.minimize(id).unwrap();
    settle(&mut wm);

    wm.resize_viewport(800.0, 400.0);
    wm.restore(id).unwrap();
    settle(&mut wm);
    assert_eq!(wm.window(id).unwrap().bounds(), Bounds::new(0.0, 0.0, 400.0, 100.0));
}

#[test]
fn minimized_position_pins_the_tile() {
    let mut wm = manager(1000.0, 800.0);
    let id = open_at(&mut wm, 10.0, 10.0);
    wm.set_minimized_position(id, 500.0, 300.0);
    assert_eq!(
        wm.window(id).unwrap().management_state(),
        ManagementState::Unmanaged
    );

    wm.minimize(id).unwrap();
    settle(&mut wm);
    assert!(wm.dock().is_empty());
    let window = wm.window(id).unwrap();
    assert_eq!(window.state(), WindowState::Minimized);
    assert_eq!(window.visible_bounds(), Bounds::new(500.0, 300.0, 170.0, 40.0));
}
