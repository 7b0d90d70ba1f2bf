use core::fmt;
use tilck_object::object::StructView;
use tilck_object::printer::{Dumper, Value};
use tilck_object::task::{Process, HANDLE, PROCESS, TASK};
use tilck_object::{InspectResult, VirtAddr};

pub const NO_TASK: &str = "No such task";
pub const NO_PROCESS: &str = "No such process";
pub const NO_HANDLE: &str = "No such handle";

const GET_TASK_USAGE: &str = "Usage: get-task <tid>";
const GET_PROC_USAGE: &str = "Usage: get-proc <pid>";
const GET_HANDLE2_USAGE: &str = "Usage: get-handle2 <pid> <handle_number>";
const GET_HANDLE_USAGE: &str = "Usage: get-handle <handle_number> # assuming the current process";

/// A parsed command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetTask { tid: i64 },
    GetProc { pid: i64 },
    GetHandle2 { pid: i64, hn: i64 },
    /// A handle of the current process.
    GetHandle { hn: i64 },
    GetCurr,
    GetCurrp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing but whitespace.
    Empty,
    /// Malformed arguments; carries the usage line.
    Usage(&'static str),
    Undefined(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => Ok(()),
            ParseError::Usage(usage) => f.write_str(usage),
            ParseError::Undefined(name) => write!(f, "Undefined command: \"{}\"", name),
        }
    }
}

/// The result of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The resolved record, dumped.
    Dump {
        type_name: &'static str,
        addr: VirtAddr,
        value: Value,
    },
    /// The lookup found nothing; nothing was dumped.
    Missing(&'static str),
}

fn one_int(args: &[&str]) -> Option<i64> {
    match args {
        [arg] => arg.parse().ok(),
        _ => None,
    }
}

impl Command {
    /// Parse `line`: a command name, then whitespace-separated arguments.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(ParseError::Empty)?;
        let args: Vec<&str> = words.collect();
        let usage = ParseError::Usage;
        match name {
            "get-task" => one_int(&args)
                .map(|tid| Command::GetTask { tid })
                .ok_or(usage(GET_TASK_USAGE)),
            "get-proc" => one_int(&args)
                .map(|pid| Command::GetProc { pid })
                .ok_or(usage(GET_PROC_USAGE)),
            "get-handle2" => match args.as_slice() {
                [pid, hn] => match (pid.parse(), hn.parse()) {
                    (Ok(pid), Ok(hn)) => Ok(Command::GetHandle2 { pid, hn }),
                    _ => Err(usage(GET_HANDLE2_USAGE)),
                },
                _ => Err(usage(GET_HANDLE2_USAGE)),
            },
            "get-handle" => one_int(&args)
                .map(|hn| Command::GetHandle { hn })
                .ok_or(usage(GET_HANDLE_USAGE)),
            "get-curr" => Ok(Command::GetCurr),
            "get-currp" => Ok(Command::GetCurrp),
            other => Err(ParseError::Undefined(other.into())),
        }
    }

    /// Resolve the command's record and dump it.
    pub fn execute(&self, dumper: &Dumper<'_>) -> InspectResult<Outcome> {
        let kernel = dumper.kernel();
        match *self {
            Command::GetTask { tid } => match kernel.get_task(tid)? {
                Some(task) => dump(dumper, TASK, task.view()),
                None => Ok(Outcome::Missing(NO_TASK)),
            },
            Command::GetProc { pid } => match kernel.get_process(pid)? {
                Some(process) => dump(dumper, PROCESS, process.view()),
                None => Ok(Outcome::Missing(NO_PROCESS)),
            },
            Command::GetHandle2 { pid, hn } => match kernel.get_process(pid)? {
                Some(process) => dump_handle(dumper, &process, hn),
                None => Ok(Outcome::Missing(NO_PROCESS)),
            },
            Command::GetHandle { hn } => dump_handle(dumper, &kernel.current_process()?, hn),
            Command::GetCurr => dump(dumper, TASK, kernel.current_task()?.view()),
            Command::GetCurrp => dump(dumper, PROCESS, kernel.current_process()?.view()),
        }
    }
}

fn dump<'a>(
    dumper: &Dumper<'a>,
    type_name: &'static str,
    view: StructView<'a>,
) -> InspectResult<Outcome> {
    Ok(Outcome::Dump {
        type_name,
        addr: view.addr(),
        value: dumper.dump(&view)?,
    })
}

fn dump_handle(dumper: &Dumper<'_>, process: &Process<'_>, hn: i64) -> InspectResult<Outcome> {
    match dumper.kernel().get_handle(process, hn)? {
        Some(handle) => dump(dumper, HANDLE, handle.view()),
        None => Ok(Outcome::Missing(NO_HANDLE)),
    }
}
