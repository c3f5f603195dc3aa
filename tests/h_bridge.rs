mod common;

mod tests {
    use embassy_time::{Duration, Instant};

    use dop_led::{
        ConfigError, DopLed, DopLedConfig, DopTimings, DriveLevel, HBridge, HBridgeError,
        HBridgeOutput, OutputState, PulseTrain, RefreshOutcome, Rgb, RgbOrder, TransmitError,
        Transmitter, build_frame,
    };

    use super::common::{
        Event, MockDelay, MockPin, MockPwm, MockTransmitter, TestBridge, event_log,
        replay_outputs, test_bridge,
    };

    const DATA_ON: [Event; 3] = [
        Event::Pin(HBridgeOutput::N2, true),
        Event::TransmitterEnabled(true),
        Event::Pin(HBridgeOutput::Reference2v5, true),
    ];

    #[test]
    fn test_missing_output_is_config_error() {
        let log = event_log();
        let result: Result<TestBridge, ConfigError> =
            HBridge::builder(MockTransmitter::with_log(&log), MockDelay::new(&log))
                .output_2v5(MockPin::new(HBridgeOutput::Reference2v5, &log))
                .output_n1_pwm(MockPwm::new(&log))
                .output_n2(MockPin::new(HBridgeOutput::N2, &log))
                .build();
        assert_eq!(
            result.err(),
            Some(ConfigError::MissingOutput(HBridgeOutput::P2))
        );

        let result: Result<TestBridge, ConfigError> =
            HBridge::builder(MockTransmitter::with_log(&log), MockDelay::new(&log)).build();
        assert_eq!(
            result.err(),
            Some(ConfigError::MissingOutput(HBridgeOutput::Reference2v5))
        );

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_build_writes_nothing() {
        let log = event_log();
        let bridge = test_bridge(&log);
        assert_eq!(bridge.level(), None);
        assert_eq!(bridge.output_state(), None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_first_drive_breaks_everything() {
        let log = event_log();
        let mut bridge = test_bridge(&log);
        bridge.drive(DriveLevel::Data).unwrap();

        let events = log.borrow();
        assert_eq!(
            events[..],
            [
                Event::Pin(HBridgeOutput::Reference2v5, false),
                Event::Pin(HBridgeOutput::N2, false),
                Event::TransmitterEnabled(false),
                Event::Duty(0),
                Event::Pin(HBridgeOutput::P2, false),
                Event::DelayMs(2),
                DATA_ON[0],
                DATA_ON[1],
                DATA_ON[2],
            ]
        );
        assert_eq!(replay_outputs(&events), DriveLevel::Data.output_state());
        assert_eq!(bridge.level(), Some(DriveLevel::Data));
    }

    #[test]
    fn test_data_to_white_sequence() {
        let log = event_log();
        let mut bridge = test_bridge(&log);
        bridge.drive(DriveLevel::Data).unwrap();
        log.borrow_mut().clear();

        bridge.drive(DriveLevel::White(128)).unwrap();
        assert_eq!(
            log.borrow()[..],
            [
                Event::Pin(HBridgeOutput::Reference2v5, false),
                Event::Pin(HBridgeOutput::N2, false),
                Event::TransmitterEnabled(false),
                Event::DelayMs(2),
                Event::Duty(128),
                Event::Pin(HBridgeOutput::P2, true),
            ]
        );
        assert_eq!(
            bridge.output_state(),
            Some(DriveLevel::White(128).output_state())
        );
    }

    #[test]
    fn test_white_to_data_sequence() {
        let log = event_log();
        let mut bridge = test_bridge(&log);
        bridge.drive(DriveLevel::White(255)).unwrap();
        log.borrow_mut().clear();

        bridge.drive(DriveLevel::Data).unwrap();
        assert_eq!(
            log.borrow()[..],
            [
                Event::Duty(0),
                Event::Pin(HBridgeOutput::P2, false),
                Event::DelayMs(2),
                DATA_ON[0],
                DATA_ON[1],
                DATA_ON[2],
            ]
        );
    }

    #[test]
    fn test_white_brightness_only_touches_pwm() {
        let log = event_log();
        let mut bridge = test_bridge(&log);
        bridge.drive(DriveLevel::White(10)).unwrap();
        log.borrow_mut().clear();

        bridge.drive(DriveLevel::White(90)).unwrap();
        assert_eq!(log.borrow()[..], [Event::Duty(90)]);
        assert_eq!(bridge.level(), Some(DriveLevel::White(90)));
    }

    #[test]
    fn test_same_level_is_noop() {
        let log = event_log();
        let mut bridge = test_bridge(&log);
        bridge.drive(DriveLevel::Off).unwrap();
        log.borrow_mut().clear();

        bridge.drive(DriveLevel::Off).unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_off_and_back_skips_settle() {
        let log = event_log();
        let mut bridge = test_bridge(&log);
        bridge.drive(DriveLevel::Data).unwrap();
        log.borrow_mut().clear();

        bridge.drive(DriveLevel::Off).unwrap();
        bridge.drive(DriveLevel::Data).unwrap();
        let events = log.borrow();
        assert!(!events.iter().any(|event| matches!(event, Event::DelayMs(_))));
        assert_eq!(bridge.output_state(), Some(DriveLevel::Data.output_state()));
    }

    #[test]
    fn test_level_sequences_never_conflict() {
        let levels = [
            DriveLevel::Data,
            DriveLevel::White(1),
            DriveLevel::White(200),
            DriveLevel::Off,
            DriveLevel::White(50),
            DriveLevel::Data,
            DriveLevel::Off,
            DriveLevel::Data,
            DriveLevel::White(0),
            DriveLevel::Data,
        ];
        for start in 0..levels.len() {
            let log = event_log();
            let mut bridge = test_bridge(&log);
            for level in levels[start..].iter().chain(&levels[..start]) {
                bridge.drive(*level).unwrap();
                assert_eq!(bridge.output_state(), Some(level.output_state()));
            }
            let final_state = replay_outputs(&log.borrow());
            assert_eq!(Some(final_state), bridge.output_state());
        }
    }

    #[test]
    fn test_conflict_detection() {
        assert!(!OutputState::OFF.is_conflicting());
        assert!(!DriveLevel::Data.output_state().is_conflicting());
        assert!(!DriveLevel::White(255).output_state().is_conflicting());

        let mut state = DriveLevel::Data.output_state();
        state.p2 = true;
        assert!(state.is_conflicting());

        let mut state = DriveLevel::White(1).output_state();
        state.n2 = true;
        assert!(state.is_conflicting());
    }

    #[test]
    fn test_transmit_switches_to_data_first() {
        let log = event_log();
        let mut bridge = test_bridge(&log);
        bridge.drive(DriveLevel::White(100)).unwrap();

        let pixels = [Rgb::new(1, 2, 3)];
        let pulses = PulseTrain::new(build_frame(&pixels, 1, RgbOrder::Rgb), DopTimings::DEFAULT);
        bridge.transmit(pulses).unwrap();

        let events = log.borrow();
        let transmit_at = events
            .iter()
            .position(|event| *event == Event::Transmit)
            .unwrap();
        let state = replay_outputs(&events[..transmit_at]);
        assert_eq!(state, DriveLevel::Data.output_state());
        assert_eq!(bridge.transmitter().frames.len(), 1);
    }

    #[test]
    fn test_output_failure_is_transmit_fault() {
        let log = event_log();
        let mut n2 = MockPin::new(HBridgeOutput::N2, &log);
        n2.fail = true;
        let bridge = HBridge::new(
            MockTransmitter::with_log(&log),
            MockPin::new(HBridgeOutput::Reference2v5, &log),
            MockPin::new(HBridgeOutput::P2, &log),
            MockPwm::new(&log),
            n2,
            MockDelay::new(&log),
        );

        let mut led = DopLed::<_, 4>::new(bridge, &DopLedConfig::new(1, 2)).unwrap();
        assert_eq!(
            led.request_refresh(Instant::from_millis(0)),
            RefreshOutcome::Deferred
        );
        assert_eq!(led.status().last_error, Some(TransmitError::Fault));
        assert!(led.transmitter().transmitter().frames.is_empty());
        assert_eq!(led.drive_level(), None);
        assert_eq!(
            led.power_off(),
            Err(HBridgeError::Output(HBridgeOutput::N2))
        );
    }

    #[test]
    fn test_driver_mode_switching() {
        let log = event_log();
        let config = DopLedConfig::new(2, 3).with_max_refresh_rate(Duration::from_millis(10));
        let mut led = DopLed::<TestBridge, 4>::new(test_bridge(&log), &config).unwrap();
        led.fill(Rgb::new(10, 20, 30));

        assert_eq!(
            led.request_refresh(Instant::from_millis(0)),
            RefreshOutcome::Sent
        );
        assert_eq!(led.drive_level(), Some(DriveLevel::Data));

        // A deferred color frame must not override white
        assert_eq!(
            led.request_refresh(Instant::from_millis(1)),
            RefreshOutcome::Deferred
        );
        led.set_white(180).unwrap();
        assert!(!led.is_refresh_pending());
        assert!(!led.tick(Instant::from_millis(50)).transmitted);
        assert_eq!(led.drive_level(), Some(DriveLevel::White(180)));

        led.power_off().unwrap();
        assert_eq!(led.drive_level(), Some(DriveLevel::Off));

        assert_eq!(
            led.request_refresh(Instant::from_millis(60)),
            RefreshOutcome::Sent
        );
        assert_eq!(led.drive_level(), Some(DriveLevel::Data));
        assert_eq!(led.transmitter().transmitter().frames.len(), 2);

        let final_state = replay_outputs(&log.borrow());
        assert_eq!(final_state, DriveLevel::Data.output_state());
    }
}
