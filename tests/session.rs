// Session transitions and packaging bundle.
mod support;
#[path = "support/common.rs"]
mod common;

use kextcatalog::{Action, DriverId, HardwareSelection, Session, SessionError};

use common::bundled_store;

fn selected(session: &Session) -> Vec<&str> {
    session.selected().iter().map(DriverId::as_str).collect()
}

#[test]
fn recommendations_follow_hardware_changes() {
    let store = bundled_store();
    let mut session = Session::default();
    session
        .apply(
            &store,
            Action::SetHardware(HardwareSelection {
                cpu_model: "AMD Ryzen 7 5800X".to_string(),
                gpu_brand: "amd".to_string(),
                ..HardwareSelection::default()
            }),
        )
        .unwrap();
    session.apply(&store, Action::ApplyRecommendations).unwrap();
    assert!(session.is_selected("realtekrtl8111"));
    assert!(session.is_selected("whatevergreen"));

    // Re-applying never duplicates.
    let before = session.selected().len();
    session.apply(&store, Action::ApplyRecommendations).unwrap();
    assert_eq!(session.selected().len(), before);
}

#[test]
fn select_deselect_and_clear() {
    let store = bundled_store();
    let mut session = Session::new(HardwareSelection::default());

    session
        .apply(&store, Action::Select(DriverId::from("voodooi2c")))
        .unwrap();
    session
        .apply(&store, Action::Select(DriverId::from("nvmefix")))
        .unwrap();
    session
        .apply(&store, Action::Select(DriverId::from("voodooi2c")))
        .unwrap();
    assert_eq!(selected(&session), vec!["voodooi2c", "nvmefix"]);

    let err = session
        .apply(&store, Action::Select(DriverId::from("ghostkext")))
        .unwrap_err();
    assert_eq!(err, SessionError::UnknownDriver(DriverId::from("ghostkext")));

    session
        .apply(&store, Action::Deselect(DriverId::from("voodooi2c")))
        .unwrap();
    session
        .apply(&store, Action::Deselect(DriverId::from("never-picked")))
        .unwrap();
    assert_eq!(selected(&session), vec!["nvmefix"]);

    session.apply(&store, Action::Clear).unwrap();
    assert!(session.selected().is_empty());
}

#[test]
fn bundle_pulls_in_dependencies_first() {
    let store = bundled_store();
    let mut session = Session::default();
    session
        .apply(&store, Action::Select(DriverId::from("intelbluetoothfirmware")))
        .unwrap();
    session
        .apply(&store, Action::Select(DriverId::from("lilu")))
        .unwrap();
    let bundle: Vec<String> = session.bundle(&store).into_iter().map(|id| id.0).collect();
    assert_eq!(bundle, vec!["lilu", "bluetoolfixup", "intelbluetoothfirmware"]);
}
