use drone_route_optimizer::battery::{AutonomyModel, BatteryError};

#[test]
fn autonomy_strictly_decreases_along_the_ladder() {
    let model = AutonomyModel::default();
    let speeds = model.valid_speeds();
    for pair in speeds.windows(2) {
        let slow = model.autonomy_s(pair[0]).expect("slow speed");
        let fast = model.autonomy_s(pair[1]).expect("fast speed");
        assert!(slow > fast, "{} km/h should outlast {} km/h", pair[0], pair[1]);
    }
}

#[test]
fn reference_constants_reproduce_known_autonomies() {
    let model = AutonomyModel::default();
    let a36 = model.autonomy_s(36).expect("36 km/h");
    let a96 = model.autonomy_s(96).expect("96 km/h");
    assert!((a36 - 4_650.0).abs() < 1e-6);
    assert!((a96 - 653.9).abs() < 0.05);
    assert!((a36 / a96 - 7.11).abs() < 0.01);
}

#[test]
fn speeds_off_the_ladder_are_rejected() {
    let model = AutonomyModel::default();
    for speed in [0, 35, 38, 100] {
        assert!(matches!(
            model.autonomy_s(speed),
            Err(BatteryError::InvalidSpeed { speed_kmh, .. }) if speed_kmh == speed
        ));
    }
}
