//! Save and load of machine state.
//!
//! Two payloads share one framing: a four byte magic, a little endian
//! version, then sections of `length | bincode body | crc32(body)`.
//!
//! - Global memory: banks G, Z and M, the name table and the kidoku table.
//! - Game: a header (title, save time), then global memory, the local
//!   memory committed by the last savepoint, and the resume point with
//!   its call stack.
//!
//! Loading decodes and validates into fresh values before anything in
//! the machine is replaced, so a bad stream leaves the machine as it was.

use super::{Frame, Machine, Savepoint};
use crate::error;
use crate::mem::{
    Address, Banks, Error, GlobalMemory, IntBank, KidokuTable, LocalMemory, NameTable, Scene,
    Scope, SparseStore, StrBank, SIZE_OF_NAME_BANK,
};
use chrono::{DateTime, Local, TimeZone};
use crc::crc32;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::{Read, Write};
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, Error>;

pub const GLOBAL_MAGIC: [u8; 4] = *b"SVGM";
pub const GAME_MAGIC: [u8; 4] = *b"SVSG";
pub const CURRENT_GLOBAL_VERSION: u32 = 1;
pub const CURRENT_GAME_VERSION: u32 = 2;

const MAX_SECTION_LEN: usize = 64 * 1024 * 1024;

/// Shown when listing save slots. Readable without decoding the rest
/// of the game payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveHeader {
    pub title: String,
    /// Seconds since the Unix epoch.
    pub saved_at: i64,
}

impl SaveHeader {
    pub fn new(title: &str) -> SaveHeader {
        SaveHeader {
            title: title.to_string(),
            saved_at: Local::now().timestamp(),
        }
    }

    pub fn saved_at_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_opt(self.saved_at, 0).single()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BankImage<B, T> {
    bank: B,
    cells: Vec<(u32, T)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BanksImage {
    ints: Vec<BankImage<IntBank, i32>>,
    strings: Vec<BankImage<StrBank, String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GlobalImage {
    banks: BanksImage,
    names: Vec<(u32, String)>,
    local_names: Vec<(u32, String)>,
    kidoku: Vec<(Scene, Vec<u32>)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResumeImage {
    scene: Scene,
    pc: Address,
    frames: Vec<Frame>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GameImage {
    global: GlobalImage,
    local: BanksImage,
    resume: ResumeImage,
}

// *** Public entry points

pub fn save_global_memory<W: Write>(writer: &mut W, machine: &Machine) -> Result<()> {
    write_preamble(writer, GLOBAL_MAGIC, CURRENT_GLOBAL_VERSION)?;
    let bytes = write_section(writer, &global_image(machine.memory().global()))?;
    debug!(bytes, "global memory saved");
    Ok(())
}

pub fn load_global_memory<R: Read>(reader: &mut R, machine: &mut Machine) -> Result<()> {
    let global = read_global(reader).map_err(|e| rejected("global memory", e))?;
    machine.restore_global(global);
    debug!("global memory loaded");
    Ok(())
}

/// Writes the committed savepoint, never the live local memory.
pub fn save_game<W: Write>(writer: &mut W, machine: &Machine) -> Result<()> {
    let savepoint = machine.savepoint();
    write_preamble(writer, GAME_MAGIC, CURRENT_GAME_VERSION)?;
    write_section(writer, &SaveHeader::new(&savepoint.title))?;
    let image = GameImage {
        global: global_image(machine.memory().global()),
        local: banks_image(&savepoint.local.banks),
        resume: ResumeImage {
            scene: savepoint.scene,
            pc: savepoint.pc,
            frames: savepoint.frames.clone(),
        },
    };
    let bytes = write_section(writer, &image)?;
    debug!(bytes, scene = savepoint.scene, "game saved");
    Ok(())
}

/// Restores global memory and the savepoint. Afterwards live local
/// memory equals the committed copy.
pub fn load_game<R: Read>(reader: &mut R, machine: &mut Machine) -> Result<()> {
    let max_depth = machine.config().max_call_depth;
    let (global, savepoint) =
        read_game(reader, max_depth).map_err(|e| rejected("saved game", e))?;
    machine.restore_global(global);
    machine.restore_savepoint(savepoint)?;
    Ok(())
}

pub fn load_game_header<R: Read>(reader: &mut R) -> Result<SaveHeader> {
    read_preamble(reader, GAME_MAGIC, CURRENT_GAME_VERSION)?;
    read_section(reader)
}

fn rejected(what: &str, error: Error) -> Error {
    warn!(%error, "{} rejected", what);
    error
}

// *** Decoding

fn read_global<R: Read>(reader: &mut R) -> Result<GlobalMemory> {
    read_preamble(reader, GLOBAL_MAGIC, CURRENT_GLOBAL_VERSION)?;
    restore_global(read_section(reader)?)
}

fn read_game<R: Read>(reader: &mut R, max_depth: usize) -> Result<(GlobalMemory, Savepoint)> {
    let header: SaveHeader = load_game_header(reader)?;
    let image: GameImage = read_section(reader)?;
    if image.resume.frames.len() > max_depth {
        return Err(error!(CorruptData; "CALL STACK DEEPER THAN MACHINE ALLOWS"));
    }
    let global = restore_global(image.global)?;
    let savepoint = Savepoint {
        local: LocalMemory {
            banks: restore_banks(image.local, Scope::Local)?,
        },
        scene: image.resume.scene,
        pc: image.resume.pc,
        frames: image.resume.frames,
        title: header.title,
    };
    Ok((global, savepoint))
}

fn corrupt(error: Error) -> Error {
    error!(CorruptData; &error.to_string())
}

fn restore_global(image: GlobalImage) -> Result<GlobalMemory> {
    let names = SparseStore::from_cells(SIZE_OF_NAME_BANK, widen(image.names)).map_err(corrupt)?;
    let local_names =
        SparseStore::from_cells(SIZE_OF_NAME_BANK, widen(image.local_names)).map_err(corrupt)?;
    let mut kidoku = KidokuTable::new();
    for (scene, offsets) in image.kidoku {
        for offset in offsets {
            kidoku.record(scene, offset as usize).map_err(corrupt)?;
        }
    }
    Ok(GlobalMemory {
        banks: restore_banks(image.banks, Scope::Global)?,
        names: NameTable::from_stores(names, local_names),
        kidoku,
    })
}

/// Banks missing from the image keep their defaults; a bank from the
/// wrong scope or listed twice is corrupt.
fn restore_banks(image: BanksImage, scope: Scope) -> Result<Banks> {
    let mut banks = match scope {
        Scope::Global => Banks::new(&IntBank::GLOBAL, &StrBank::GLOBAL),
        Scope::Local => Banks::new(&IntBank::LOCAL, &StrBank::LOCAL),
    };
    let mut seen = BTreeSet::new();
    for bank_image in image.ints {
        let bank = bank_image.bank;
        if bank.scope() != scope || !seen.insert(bank.letter()) {
            return Err(error!(CorruptData; &format!("UNEXPECTED BANK {}", bank)));
        }
        let store = SparseStore::from_cells(bank.capacity(), widen(bank_image.cells))
            .map_err(corrupt)?;
        *banks.int_mut(bank)? = store;
    }
    let mut seen = BTreeSet::new();
    for bank_image in image.strings {
        let bank = bank_image.bank;
        if bank.scope() != scope || !seen.insert(bank.letter()) {
            return Err(error!(CorruptData; &format!("UNEXPECTED BANK {}", bank)));
        }
        let store = SparseStore::from_cells(bank.capacity(), widen(bank_image.cells))
            .map_err(corrupt)?;
        *banks.string_mut(bank)? = store;
    }
    Ok(banks)
}

fn widen<T>(cells: Vec<(u32, T)>) -> impl Iterator<Item = (usize, T)> {
    cells.into_iter().map(|(i, v)| (i as usize, v))
}

// *** Encoding

fn cells<T: Clone + Default>(store: &SparseStore<T>) -> Vec<(u32, T)> {
    store
        .allocated()
        .map(|(i, v)| (i as u32, v.clone()))
        .collect()
}

fn banks_image(banks: &Banks) -> BanksImage {
    BanksImage {
        ints: banks
            .int_banks()
            .map(|(bank, store)| BankImage {
                bank,
                cells: cells(store),
            })
            .collect(),
        strings: banks
            .str_banks()
            .map(|(bank, store)| BankImage {
                bank,
                cells: cells(store),
            })
            .collect(),
    }
}

fn global_image(global: &GlobalMemory) -> GlobalImage {
    GlobalImage {
        banks: banks_image(&global.banks),
        names: cells(global.names.names()),
        local_names: cells(global.names.local_names()),
        kidoku: global
            .kidoku
            .entries()
            .map(|(scene, offsets)| (scene, offsets.into_iter().map(|o| o as u32).collect()))
            .collect(),
    }
}

// *** Framing

fn write_preamble<W: Write>(writer: &mut W, magic: [u8; 4], version: u32) -> Result<()> {
    writer.write_all(&magic)?;
    writer.write_all(&version.to_le_bytes())?;
    Ok(())
}

fn read_preamble<R: Read>(reader: &mut R, magic: [u8; 4], version: u32) -> Result<()> {
    let mut found = [0; 4];
    reader.read_exact(&mut found)?;
    if found != magic {
        return Err(error!(CorruptData; "NOT A SAVE FILE OF THIS KIND"));
    }
    let found = read_u32(reader)?;
    if found != version {
        return Err(error!(CorruptData; &format!(
            "VERSION {} WHERE {} EXPECTED",
            found, version
        )));
    }
    Ok(())
}

fn write_section<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<usize> {
    let body = match bincode::serialize(value) {
        Ok(body) => body,
        Err(e) => return Err(error!(InternalError; &e.to_string())),
    };
    if body.len() > MAX_SECTION_LEN {
        return Err(error!(InternalError; "SECTION TOO LARGE"));
    }
    writer.write_all(&(body.len() as u32).to_le_bytes())?;
    writer.write_all(&body)?;
    writer.write_all(&crc32::checksum_ieee(&body).to_le_bytes())?;
    Ok(body.len())
}

fn read_section<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T> {
    let len = read_u32(reader)? as usize;
    if len > MAX_SECTION_LEN {
        return Err(error!(CorruptData; "SECTION TOO LARGE"));
    }
    let mut body = vec![0; len];
    reader.read_exact(&mut body)?;
    if read_u32(reader)? != crc32::checksum_ieee(&body) {
        return Err(error!(CorruptData; "CHECKSUM MISMATCH"));
    }
    bincode::deserialize(&body).map_err(|e| error!(CorruptData; &e.to_string()))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}
