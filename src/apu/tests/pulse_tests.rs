//! Pulse channel functionality tests

use super::*;

#[test]
fn test_pulse_duty_cycle_patterns() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x01);

    for duty in 0..4 {
        apu.write_register(PULSE0_CONTROL, (duty << 6) | 0x30);
        apu.write_register(PULSE0_LENGTH, 0x08);

        assert_eq!(apu.pulse0.duty, duty);
    }
}

#[test]
fn test_pulse_envelope_constant_volume() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x01);

    apu.write_register(PULSE0_CONTROL, 0x1A); // Constant volume 10
    apu.write_register(PULSE0_LENGTH, 0x08);

    assert_eq!(apu.pulse0.envelope.volume(), 10);
    apu.clock_quarter_frame();
    assert_eq!(apu.pulse0.envelope.volume(), 10);
}

#[test]
fn test_pulse_envelope_decay_is_monotonic() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x01);

    apu.write_register(PULSE0_CONTROL, 0x02); // Decay, no loop, period 2
    apu.write_register(PULSE0_TIMER_LOW, 0x80);
    apu.write_register(PULSE0_LENGTH, 0x08);
    assert!(apu.pulse0.envelope.start);

    apu.clock_quarter_frame();
    assert_eq!(apu.pulse0.envelope.decay_level, 15);
    assert!(!apu.pulse0.envelope.start);

    let mut levels = vec![apu.pulse0.envelope.volume()];
    for _ in 0..100 {
        apu.clock_quarter_frame();
        levels.push(apu.pulse0.envelope.volume());
    }

    assert!(levels.windows(2).all(|pair| pair[1] <= pair[0]));
    assert_eq!(*levels.last().unwrap(), 0);

    // Effective volume stays at zero
    apu.pulse0.duty_position = 1;
    assert_eq!(apu.pulse0_output(), 0);
}

#[test]
fn test_pulse_envelope_loop() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x01);
    apu.write_register(PULSE0_CONTROL, 0x20); // Loop, period 0
    apu.write_register(PULSE0_LENGTH, 0x08);

    apu.clock_quarter_frame(); // 15
    for _ in 0..15 {
        apu.clock_quarter_frame();
    }
    assert_eq!(apu.pulse0.envelope.decay_level, 0);

    apu.clock_quarter_frame();
    assert_eq!(apu.pulse0.envelope.decay_level, 15);
}

#[test]
fn test_pulse_length_counter_halt() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x01);
    apu.write_register(PULSE0_CONTROL, 0x30); // Halt
    apu.write_register(PULSE0_LENGTH, 0x18);

    for _ in 0..10 {
        apu.clock_half_frame();
    }

    assert_eq!(apu.pulse0.length_counter.counter, 2);
}

#[test]
fn test_pulse_length_counter_silences_regardless_of_volume() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x01);
    apu.write_register(PULSE0_CONTROL, 0x9F); // 50%, constant volume 15
    apu.write_register(PULSE0_TIMER_LOW, 0x20);
    apu.write_register(PULSE0_LENGTH, 0x18); // length 2

    apu.clock_half_frame();
    apu.clock_half_frame();

    assert_eq!(apu.pulse0.envelope.volume(), 15);
    for _ in 0..1000 {
        apu.clock();
        assert_eq!(apu.pulse0_output(), 0);
    }
}

#[test]
fn test_sweep_overflow_silences_on_next_half_frame() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x01);
    apu.write_register(PULSE0_CONTROL, 0xBF);
    apu.write_register(PULSE0_SWEEP, 0x81); // Enabled, period 0, shift 1
    apu.write_register(PULSE0_TIMER_LOW, 0x00);
    apu.write_register(PULSE0_LENGTH, 0x0D); // period 0x500, length 254

    assert!(apu.pulse0.is_active());

    // 0x500 sweeps to 0x780, whose own target 0xB40 is out of range
    apu.clock_half_frame();

    assert_eq!(apu.pulse0.timer.period, 0x780);
    assert!(apu.pulse0.length_counter.counter > 0);
    assert!(!apu.pulse0.is_active());
    assert_eq!(apu.pulse0_output(), 0);
}

#[test]
fn test_sweep_target_checked_on_register_write() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x01);
    apu.write_register(PULSE0_CONTROL, 0xBF);
    apu.write_register(PULSE0_SWEEP, 0x03);
    apu.write_register(PULSE0_TIMER_LOW, 0x00);
    apu.write_register(PULSE0_LENGTH, 0x0E); // period 0x600, target 0x6C0
    assert!(apu.pulse0.is_active());

    // Shift 1 puts the target at 0x900, even with the sweep disabled
    apu.write_register(PULSE0_SWEEP, 0x01);

    assert!(!apu.pulse0.is_active());
}

#[test]
fn test_sweep_negate_asymmetry_between_pulses() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x03);
    for (sweep, timer, length) in [
        (PULSE0_SWEEP, PULSE0_TIMER_LOW, PULSE0_LENGTH),
        (PULSE1_SWEEP, PULSE1_TIMER_LOW, PULSE1_LENGTH),
    ] {
        apu.write_register(sweep, 0x89); // Enabled, negate, shift 1
        apu.write_register(timer, 100);
        apu.write_register(length, 0x08);
    }

    apu.clock_half_frame();

    assert_eq!(apu.pulse0.timer.period, 49);
    assert_eq!(apu.pulse1.timer.period, 50);
}

#[test]
fn test_pulse_register_writes_are_idempotent() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x01);
    let values = [0x9F, 0x8A, 0x40, 0x21];

    for (offset, value) in values.iter().enumerate() {
        apu.write_register(offset as u8, *value);
    }
    let first = apu.pulse0.clone();

    for (offset, value) in values.iter().enumerate() {
        apu.write_register(offset as u8, *value);
    }

    assert_eq!(apu.pulse0, first);
    assert!(apu.pulse0.envelope.start);
    assert!(apu.pulse0.sweep.reload);

    // The one-shot flags are consumed by the next ticks
    apu.clock_quarter_frame();
    apu.clock_half_frame();
    assert!(!apu.pulse0.envelope.start);
    assert!(!apu.pulse0.sweep.reload);
}

#[test]
fn test_pulse_produces_square_wave() {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x01);
    apu.write_register(PULSE0_CONTROL, 0xBF);
    apu.write_register(PULSE0_TIMER_LOW, 0x10);
    apu.write_register(PULSE0_LENGTH, 0x08);

    let mut highs = 0;
    let mut lows = 0;
    // 2 * (0x10 + 1) cycles per step, 8 steps per period
    for _ in 0..(34 * 8) {
        match apu.produce_next_sample() {
            60 => highs += 1,
            -60 => lows += 1,
            other => panic!("unexpected sample {}", other),
        }
    }

    assert_eq!(highs, lows);
}
