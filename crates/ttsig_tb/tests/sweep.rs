//! End-to-end sweeps against the behavioral sigmoid core.

use ttsig_device::{Fault, SigmoidModel};
use ttsig_sim::{SimConfig, SimError, SimTime, FS_PER_NS, FS_PER_US};
use ttsig_tb::{run_test_project, SweepConfig, TbError};

#[test]
fn full_sweep_passes() {
    let report =
        run_test_project(SigmoidModel::new(), &SweepConfig::default(), &SimConfig::default())
            .unwrap();
    assert_eq!(report.inputs_checked, 80);

    // Each check: 10 reset edges plus the sampling edge, then a 1 ns settle.
    // The first reset edge is at t = 0; later checks start mid-period.
    let period = 10 * FS_PER_US;
    let last_edge = (80 * 11 - 1) * period;
    assert_eq!(report.final_time, SimTime::from_fs(last_edge + FS_PER_NS));
}

#[test]
fn full_sweep_with_ten_ns_settle_passes() {
    let mut config = SweepConfig::default();
    config.timing.settle = SimTime::from_ns(10);
    let report = run_test_project(SigmoidModel::new(), &config, &SimConfig::default()).unwrap();
    assert_eq!(report.inputs_checked, 80);
}

#[test]
fn stuck_output_fails_at_first_input() {
    let err = run_test_project(
        SigmoidModel::with_fault(Fault::StuckAt(0)),
        &SweepConfig::default(),
        &SimConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected uo_out to be 255 for ui_in=40, but got 0"
    );
}

#[test]
fn off_by_one_fails_at_faulty_input() {
    let err = run_test_project(
        SigmoidModel::with_fault(Fault::OffByOne(-7)),
        &SweepConfig::default(),
        &SimConfig::default(),
    )
    .unwrap_err();
    match err {
        TbError::Mismatch {
            input,
            expected,
            actual,
        } => {
            assert_eq!(input, -7);
            assert_eq!(expected, 100);
            assert_eq!(actual, 101);
        }
        other => panic!("expected a mismatch, got {other}"),
    }
}

#[test]
fn symmetric_clamp_caught_at_31() {
    let err = run_test_project(
        SigmoidModel::with_fault(Fault::SymmetricClamp),
        &SweepConfig::default(),
        &SimConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected uo_out to be 252 for ui_in=31, but got 255"
    );
}

#[test]
fn time_limit_aborts_sweep() {
    let sim_config = SimConfig {
        time_limit: Some(SimTime::from_us(500)),
        ..SimConfig::default()
    };
    let err = run_test_project(SigmoidModel::new(), &SweepConfig::default(), &sim_config)
        .unwrap_err();
    assert!(matches!(
        err,
        TbError::Sim(SimError::TimeLimitExceeded { .. })
    ));
}

#[test]
fn unknown_clock_port_is_reported() {
    let config = SweepConfig {
        clock_port: "clock".into(),
        ..SweepConfig::default()
    };
    let err = run_test_project(SigmoidModel::new(), &config, &SimConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "no signal named 'clock'");
}

#[test]
fn waveform_contains_tiny_tapeout_pins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.vcd");
    let config = SweepConfig {
        start: 1,
        end: 0,
        ..SweepConfig::default()
    };
    let sim_config = SimConfig {
        waveform_path: Some(path.clone()),
        ..SimConfig::default()
    };
    run_test_project(SigmoidModel::new(), &config, &sim_config).unwrap();

    let vcd = std::fs::read_to_string(&path).unwrap();
    assert!(vcd.contains("$scope module tt_um_sigmoid_8bit $end"));
    for pin in ["clk", "ena", "rst_n"] {
        assert!(vcd.contains(&format!(" {pin} $end")), "missing {pin}");
    }
    for pin in ["ui_in", "uio_in", "uo_out", "uio_out", "uio_oe"] {
        assert!(vcd.contains(&format!(" {pin} [7:0] $end")), "missing {pin}");
    }
    // ui_in = 1 and uo_out = 132 both appear.
    assert!(vcd.contains("b00000001 "));
    assert!(vcd.contains("b10000100 "));
}
