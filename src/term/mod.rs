/*!
## Rust Terminal Module

A line edited console for inspecting and driving a machine by hand.
Global memory is loaded from the save directory on start and written
back on exit or interrupt.

*/

extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;
use crate::error;
use crate::mach::{Arg, Frame, Machine, MemModule, SaveDirectory, Trigger};
use crate::mem::{
    int_to_letter_index, letter_index_to_int, BitWidth, Error, IntBank, IntMemRef, StrBank,
};
use ansi_term::Style;
use linefeed::{Interface, ReadResult, Signal};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

type Result<T> = std::result::Result<T, Error>;

pub fn main(save_dir: PathBuf) {
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    }) {
        warn!(%error, "no interrupt handler");
    }
    let mut console = Console::new(Machine::default(), SaveDirectory::new(save_dir));
    if let Err(error) = console.start() {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
    }
    if let Err(error) = main_loop(&mut console, interrupted) {
        eprintln!("{}", error);
    }
    if let Err(error) = console.shutdown() {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
    }
}

fn main_loop(console: &mut Console, interrupted: Arc<AtomicBool>) -> std::io::Result<()> {
    let interface = Interface::new("scenevm")?;
    interface.set_report_signal(Signal::Interrupt, true);
    interface.set_prompt("> ")?;
    loop {
        if interrupted.load(Ordering::SeqCst) {
            break;
        }
        let line = match interface.read_line()? {
            ReadResult::Input(line) => line,
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        match console.enter(&line) {
            Ok(Reply::Done) => {}
            Ok(Reply::Print(text)) => interface.write_fmt(format_args!("{}\n", text))?,
            Ok(Reply::Quit) => break,
            Err(error) => interface.write_fmt(format_args!(
                "{}\n",
                Style::new().bold().paint(error.to_string())
            ))?,
        }
        if !line.trim().is_empty() {
            interface.add_history_unique(line);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Done,
    Print(String),
    Quit,
}

const HELP: &str = "\
get REF | set REF N          REF is A[3], A8b[3] or A3
str S[0] | setstr S[0] TEXT  string banks K, M, S
name AB | setname AB TEXT    (lname / setlname for local names), names
record N | read N            kidoku of the current scene
jump SCENE PC | gosub PC | farcall SCENE PC | ret | retfar | stack
setrng REF REF N | sum REF REF
title TEXT | mark | message | select
save N | load N | saves | gsave | gload
reset | session | quit";

/// ## Console commands
///
/// One command per line, separated from the machine so that the loop
/// owning the terminal stays thin.

pub struct Console {
    machine: Machine,
    saves: SaveDirectory,
}

impl Console {
    pub fn new(mut machine: Machine, saves: SaveDirectory) -> Console {
        if let Err(error) = machine.attach_module(Box::new(MemModule::new())) {
            warn!(%error, "memory module not attached");
        }
        Console { machine, saves }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Loads global memory if a file for it exists.
    pub fn start(&mut self) -> Result<()> {
        self.saves.load_global(&mut self.machine)?;
        Ok(())
    }

    pub fn shutdown(&self) -> Result<()> {
        self.saves.save_global(&self.machine)
    }

    pub fn enter(&mut self, line: &str) -> Result<Reply> {
        let mut words = line.trim().splitn(2, char::is_whitespace);
        let command = words.next().unwrap_or("").to_ascii_lowercase();
        let rest = words.next().unwrap_or("").trim();
        let args: Vec<&str> = rest.split_whitespace().collect();
        let m = &mut self.machine;
        let reply = match command.as_str() {
            "" => Reply::Done,
            "help" => Reply::Print(HELP.to_string()),
            "get" => {
                let mem_ref = int_ref(arg(&args, 0)?)?;
                Reply::Print(m.int_value(&mem_ref)?.to_string())
            }
            "set" => {
                let mem_ref = int_ref(arg(&args, 0)?)?;
                m.set_int_value(&mem_ref, number(arg(&args, 1)?)?)?;
                Reply::Done
            }
            "str" => {
                let (bank, index) = str_ref(arg(&args, 0)?)?;
                Reply::Print(format!("{:?}", m.string_value(bank, index)?))
            }
            "setstr" => {
                let (bank, index) = str_ref(arg(&args, 0)?)?;
                m.set_string_value(bank, index, tail(rest))?;
                Reply::Done
            }
            "name" | "lname" => {
                let index = letter_index_to_int(arg(&args, 0)?)?;
                let name = match command.as_str() {
                    "name" => m.name(index)?,
                    _ => m.local_name(index)?,
                };
                Reply::Print(format!("{:?}", name))
            }
            "names" => {
                let lines: Vec<String> = m
                    .memory()
                    .names()
                    .names()
                    .allocated()
                    .map(|(i, name)| format!("{:>2} {}", int_to_letter_index(i), name))
                    .collect();
                Reply::Print(lines.join("\n"))
            }
            "setname" | "setlname" => {
                let index = letter_index_to_int(arg(&args, 0)?)?;
                let names = m.memory_mut().names_mut();
                match command.as_str() {
                    "setname" => names.set_name(index, tail(rest))?,
                    _ => names.set_local_name(index, tail(rest))?,
                }
                Reply::Done
            }
            "record" => {
                m.record_kidoku(count(arg(&args, 0)?)?)?;
                Reply::Done
            }
            "read" => Reply::Print(m.has_been_read(count(arg(&args, 0)?)?).to_string()),
            "jump" => {
                m.jump(count(arg(&args, 0)?)? as u32, count(arg(&args, 1)?)?);
                Reply::Done
            }
            "gosub" => {
                m.gosub(count(arg(&args, 0)?)?)?;
                Reply::Done
            }
            "farcall" => {
                m.farcall(count(arg(&args, 0)?)? as u32, count(arg(&args, 1)?)?)?;
                Reply::Done
            }
            "ret" => {
                m.return_from_gosub()?;
                Reply::Done
            }
            "retfar" => {
                m.return_from_farcall()?;
                Reply::Done
            }
            "stack" => Reply::Print(describe_stack(m)),
            "setrng" => {
                let call_args = [
                    Arg::IntRef(int_ref(arg(&args, 0)?)?),
                    Arg::IntRef(int_ref(arg(&args, 1)?)?),
                    Arg::Int(number(arg(&args, 2)?)?),
                ];
                m.call(MemModule::MODULE_TYPE, MemModule::MODULE_ID, 1, 1, &call_args)?;
                Reply::Done
            }
            "sum" => {
                let call_args = [
                    Arg::IntRef(int_ref(arg(&args, 0)?)?),
                    Arg::IntRef(int_ref(arg(&args, 1)?)?),
                ];
                m.call(MemModule::MODULE_TYPE, MemModule::MODULE_ID, 100, 0, &call_args)?;
                Reply::Print(m.store_register().to_string())
            }
            "title" => {
                m.set_title(rest);
                Reply::Done
            }
            "mark" => {
                m.mark_savepoint();
                Reply::Done
            }
            "message" | "select" => {
                let trigger = match command.as_str() {
                    "message" => Trigger::Message,
                    _ => Trigger::Selection,
                };
                if m.on_savepoint_trigger(trigger) {
                    Reply::Print("savepoint marked".to_string())
                } else {
                    Reply::Print("no savepoint".to_string())
                }
            }
            "save" => {
                self.saves.save_game(count(arg(&args, 0)?)?, &self.machine)?;
                Reply::Done
            }
            "load" => {
                self.saves
                    .load_game(count(arg(&args, 0)?)?, &mut self.machine)?;
                Reply::Done
            }
            "saves" => {
                let lines: Vec<String> = self
                    .saves
                    .list_slots()?
                    .iter()
                    .map(|(slot, header)| {
                        let when = header
                            .saved_at_local()
                            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                            .unwrap_or_default();
                        format!("{:3}  {}  {}", slot, when, header.title)
                    })
                    .collect();
                Reply::Print(lines.join("\n"))
            }
            "gsave" => {
                self.saves.save_global(&self.machine)?;
                Reply::Done
            }
            "gload" => {
                self.saves.load_global(&mut self.machine)?;
                Reply::Done
            }
            "reset" => {
                m.reset();
                Reply::Done
            }
            "session" => {
                m.new_session();
                Reply::Done
            }
            "quit" | "exit" => Reply::Quit,
            _ => return Err(error!(UnknownOpcode; &format!("UNKNOWN COMMAND {}", command))),
        };
        Ok(reply)
    }
}

fn describe_stack(machine: &Machine) -> String {
    let state = machine.state();
    let mut out = format!("scene {} pc {}", state.scene(), state.pc());
    for frame in state.frames().iter().rev() {
        match frame {
            Frame::Gosub { pc } => out.push_str(&format!("\n  gosub from pc {}", pc)),
            Frame::Farcall { scene, pc } => {
                out.push_str(&format!("\n  farcall from scene {} pc {}", scene, pc))
            }
        }
    }
    out
}

fn arg<'a>(args: &[&'a str], n: usize) -> Result<&'a str> {
    match args.get(n) {
        Some(s) => Ok(s),
        None => Err(error!(TypeMismatch; &format!("MISSING ARGUMENT {}", n + 1))),
    }
}

/// Everything after the first argument.
fn tail(rest: &str) -> &str {
    match rest.find(char::is_whitespace) {
        Some(at) => rest[at..].trim(),
        None => "",
    }
}

fn number(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| error!(TypeMismatch; &format!("NOT A NUMBER {}", s)))
}

fn count(s: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| error!(IndexOutOfRange; &format!("NOT AN INDEX {}", s)))
}

/// Splits `A8b[3]` into bank letter, width text and index. The bracket
/// may be left out when there is no width: `A3`.
fn split_ref(token: &str) -> Result<(char, &str, usize)> {
    let mut chars = token.chars();
    let letter = match chars.next() {
        Some(c) => c.to_ascii_uppercase(),
        None => return Err(error!(MalformedIndex; "MISSING REFERENCE")),
    };
    let rest = chars.as_str();
    let (width, index) = match rest.find('[') {
        Some(open) => match rest[open + 1..].strip_suffix(']') {
            Some(index) => (&rest[..open], index),
            None => return Err(error!(MalformedIndex; &format!("BAD REFERENCE {}", token))),
        },
        None => ("", rest),
    };
    Ok((letter, width, count(index)?))
}

fn int_ref(token: &str) -> Result<IntMemRef> {
    let (letter, width, index) = split_ref(token)?;
    let width: BitWidth = width.parse()?;
    Ok(IntMemRef::with_width(IntBank::from_letter(letter)?, width, index))
}

fn str_ref(token: &str) -> Result<(StrBank, usize)> {
    let (letter, width, index) = split_ref(token)?;
    if !width.is_empty() {
        return Err(error!(InvalidBank; "STRINGS HAVE NO BIT WIDTH"));
    }
    Ok((StrBank::from_letter(letter)?, index))
}
