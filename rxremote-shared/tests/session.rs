use std::io;

use rxremote_shared::nec::{self, NecCommand, PulseFrame};
use rxremote_shared::{Flow, IrLine, Session, Transmitter, CUSTOM_CODE};

/// Keeps every frame with the simulated time it was emitted at
#[derive(Default)]
struct Recorder {
    now_ms: u64,
    frames: Vec<(u64, Vec<u16>)>,
}

impl IrLine for Recorder {
    fn emit(&mut self, frame: &PulseFrame) -> io::Result<()> {
        self.frames.push((self.now_ms, frame.pulses().to_vec()));
        Ok(())
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.now_ms += u64::from(ms);
    }
}

impl Recorder {
    fn decoded(&self) -> Vec<NecCommand> {
        self.frames
            .iter()
            .map(|(_, pulses)| nec::decode(pulses).unwrap())
            .collect()
    }
}

fn run(lines: &[&str]) -> (Recorder, String, Vec<Flow>) {
    let mut rec = Recorder::default();
    let mut out: Vec<u8> = Vec::new();
    let mut flows = Vec::new();

    {
        let mut session = Session::new(Transmitter::new(&mut rec, CUSTOM_CODE), &mut out);
        for line in lines {
            flows.push(session.handle_line(line).unwrap());
        }
    }

    (rec, String::from_utf8(out).unwrap(), flows)
}

#[test]
fn volume_up_sends_one_frame() {
    let (rec, out, _) = run(&["vol+"]);

    assert_eq!(rec.decoded(), vec![NecCommand::new(0x78, 0x1E)]);
    assert!(out.contains("0x1E"), "{}", out);
    assert!(out.contains("VOLUME UP"));
}

#[test]
fn power_sends_two_frames() {
    let (rec, out, _) = run(&["power", "vol-"]);

    let power = NecCommand::new(0x78, 0x0F);
    assert_eq!(
        rec.decoded(),
        vec![power, power, NecCommand::new(0x78, 0x1F)]
    );

    let times: Vec<u64> = rec.frames.iter().map(|(t, _)| *t).collect();
    assert!(times[1] > times[0]);
    // The next command waits at least 500 ms after the second power frame
    assert!(times[2] >= times[1] + 500);
    assert!(out.contains("0x0F"));
}

#[test]
fn unknown_command_sends_nothing() {
    let (rec, out, flows) = run(&["xyz", "FOOBAR"]);

    assert!(rec.frames.is_empty());
    assert!(out.contains("Unknown command: XYZ"), "{}", out);
    assert!(out.contains("Unknown command: FOOBAR"));
    assert_eq!(flows, vec![Flow::Continue, Flow::Continue]);
}

#[test]
fn case_and_whitespace_do_not_matter() {
    let (rec, _, _) = run(&[" play \n", "PLAY", "Play"]);

    let play = NecCommand::new(0x78, 0x02);
    assert_eq!(rec.decoded(), vec![play, play, play]);
}

#[test]
fn help_and_debug_send_nothing() {
    let (rec, out, _) = run(&["help", "debug vol+", ""]);

    assert!(rec.frames.is_empty());
    assert!(out.contains("POWER/PWR"));
    assert!(out.contains("=== DEBUG: VOLUME UP ==="));
    assert!(out.contains("~Command: 0xE1"));
    assert!(out.contains("~Address: 0x87"));
    assert!(out.contains("Pulses:   67"));
}

#[test]
fn test_sequence() {
    let (rec, out, _) = run(&["test"]);

    assert_eq!(
        rec.decoded(),
        vec![
            NecCommand::new(0x78, 0x1E),
            NecCommand::new(0x78, 0x1F),
            NecCommand::new(0x78, 0x0F),
            NecCommand::new(0x78, 0x0F),
        ]
    );

    let times: Vec<u64> = rec.frames.iter().map(|(t, _)| *t).collect();
    assert_eq!(times, vec![0, 1100, 2200, 2300]);
    assert_eq!(rec.now_ms, 2300 + 500 + 2000);
    assert!(out.contains("Test done."));
}

#[test]
fn quit_ends_the_loop() {
    let (rec, _, flows) = run(&["1", "quit", "2"]);

    assert_eq!(flows, vec![Flow::Continue, Flow::Quit, Flow::Continue]);
    assert_eq!(rec.decoded().len(), 2);
}

#[test]
fn trigger_is_power_with_debounce() {
    let mut rec = Recorder::default();
    let mut out: Vec<u8> = Vec::new();

    {
        let mut session = Session::new(Transmitter::new(&mut rec, CUSTOM_CODE), &mut out);
        session.trigger().unwrap();
    }

    let power = NecCommand::new(0x78, 0x0F);
    assert_eq!(rec.decoded(), vec![power, power]);
    assert_eq!(rec.now_ms, 100 + 500 + 500);
}

#[test]
fn digits() {
    let lines: Vec<String> = (0..10).map(|n| n.to_string()).collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let (rec, _, _) = run(&lines);

    let codes: Vec<u8> = rec.decoded().iter().map(|c| c.cmd).collect();
    assert_eq!(codes, (0x10..=0x19).collect::<Vec<u8>>());
}
