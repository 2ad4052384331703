#![no_main]
use libfuzzer_sys::fuzz_target;
use serial_logger::{Session, SessionState};

fuzz_target!(|data: &[u8]| {
    let mut session = Session::new(
        std::io::empty(),
        Some(Vec::<Vec<u8>>::new()),
        Vec::new(),
        || "Thu Jan  1 00:00:00 1970".to_string(),
        b'z',
    );
    let mut lines = 0;
    for line in data.split_inclusive(|byte| *byte == b'\n') {
        lines += 1;
        if session.handle_line(line).unwrap() != SessionState::Running {
            assert_eq!(line[0], b'z');
            break;
        }
    }
    assert!(session.log().unwrap().len() <= lines);
});
