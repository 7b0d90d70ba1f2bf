use std::io::{self, BufRead, Write};
use tilck_config::InspectConfig;
use tilck_object::printer::{Dumper, Printers};

use crate::commands::{Command, ParseError};
use crate::format;

pub const PROMPT: &str = "(tkdbg) ";

/// A loaded target and the printers used to dump it.
pub struct Session {
    config: InspectConfig,
    printers: Printers,
}

impl Session {
    pub fn new(config: InspectConfig) -> Self {
        Session {
            config,
            printers: Printers::tilck(),
        }
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut InspectConfig {
        &mut self.config
    }

    pub fn dumper(&self) -> Dumper<'_> {
        Dumper::new(self.config.kernel(), &self.printers)
    }

    /// Run one command line, writing its output to `out`.
    ///
    /// Bad arguments, lookup misses and failed reads all end the command,
    /// never the session. Only a failing `out` is returned as an error.
    pub fn run_line(&self, line: &str, out: &mut dyn Write) -> io::Result<()> {
        let cmd = match Command::parse(line) {
            Ok(cmd) => cmd,
            Err(ParseError::Empty) => return Ok(()),
            Err(e) => return writeln!(out, "{}", e),
        };
        debug!("run {:?}", cmd);
        match cmd.execute(&self.dumper()) {
            Ok(outcome) => writeln!(out, "{}", format::render_outcome(&outcome)),
            Err(e) => {
                debug!("{}: {}", line.trim(), e);
                writeln!(out, "{}", e)
            }
        }
    }

    /// Read and run commands until end of input, `quit` or `exit`.
    pub fn repl(&self, mut input: impl BufRead, out: &mut dyn Write) -> io::Result<()> {
        let mut line = String::new();
        loop {
            out.write_all(PROMPT.as_bytes())?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                return writeln!(out);
            }
            match line.trim() {
                "quit" | "exit" => return Ok(()),
                cmd => self.run_line(cmd, out)?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::Mutex;

    struct Capture(Mutex<Vec<Level>>);

    impl Log for Capture {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.0.lock().unwrap().push(record.level());
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    #[test]
    fn failures_are_reported_once() {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Trace);
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/tilck-i386.toml");
        let session = Session::new(InspectConfig::load(path).unwrap());

        let mut out = Vec::new();
        session.run_line("get-task 1", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "no symbol \"tilck_tasks\" in current context\n"
        );
        let levels = CAPTURE.0.lock().unwrap();
        assert!(levels.contains(&Level::Debug));
        assert!(levels.iter().all(|level| *level > Level::Warn));
    }
}
