//! Solution traces: per-move replay and a binary trace file.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "PEGT" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Side: u16 LE (2 bytes)
//!   - Short edge: u16 LE (2 bytes)
//!   - Move count: u32 LE (4 bytes)
//!   - Checksum: u64 LE xxhash of data section (8 bytes)
//!   - Reserved: 8 bytes (zeros)
//! - Data section (move_count × 5 bytes):
//!   - Reference slot: u32 LE (4 bytes)
//!   - Axis: u8 (0 = horizontal, 1 = vertical)
//!
//! Moves are stored by reference slot and axis rather than catalog id, and
//! every move is re-validated against a fresh board on replay.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use peg_core::{Axis, Board, BoardConfig, MoveCatalog, MoveId};
use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

const MAGIC: &[u8; 4] = b"PEGT";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
const ENTRY_SIZE: usize = 5;

/// Errors from reading, writing or replaying a trace.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("trace I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a trace file (bad magic)")]
    BadMagic,

    #[error("unsupported trace version: {0}")]
    UnsupportedVersion(u32),

    #[error("trace size mismatch: expected {expected} bytes, found {found}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("trace checksum mismatch")]
    ChecksumMismatch,

    #[error("trace holds {count} moves but the board has only {slots} slots")]
    TooManyMoves { count: usize, slots: usize },

    #[error("invalid board in trace: {0}")]
    Board(#[from] peg_core::ConfigError),

    #[error("move {step}: unknown axis code {code}")]
    UnknownAxis { step: usize, code: u8 },

    #[error("move {step}: no move at slot {reference} along {axis:?}")]
    UnknownMove {
        step: usize,
        reference: usize,
        axis: Axis,
    },

    #[error("move {step}: slot {reference} along {axis:?} is not playable")]
    IllegalMove {
        step: usize,
        reference: usize,
        axis: Axis,
    },

    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One played move with the board it left behind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub move_id: MoveId,
    pub reference: usize,
    pub axis: Axis,
    /// Slot the pin jumped from
    pub from: usize,
    /// Slot whose pin was removed
    pub over: usize,
    /// Slot the pin landed in
    pub to: usize,
    /// One entry per grid cell after the move
    pub occupancy: Vec<bool>,
}

impl TraceStep {
    /// Pins on the board after this move.
    pub fn pins(&self) -> usize {
        self.occupancy.iter().filter(|&&occupied| occupied).count()
    }
}

/// Play `moves` from the start position of `config`, validating each one.
pub fn replay<I>(config: BoardConfig, moves: I) -> Result<Vec<TraceStep>, TraceError>
where
    I: IntoIterator<Item = (usize, Axis)>,
{
    let mut board = Board::new(config)?;
    let catalog = MoveCatalog::new(&board);

    let mut steps = Vec::new();
    for (i, (reference, axis)) in moves.into_iter().enumerate() {
        let step = i + 1;
        let move_id = catalog
            .find(reference, axis)
            .ok_or(TraceError::UnknownMove {
                step,
                reference,
                axis,
            })?;
        let mov = catalog[move_id];
        let (from, to) = mov.jump(&board).ok_or(TraceError::IllegalMove {
            step,
            reference,
            axis,
        })?;
        mov.do_move(&mut board);
        steps.push(TraceStep {
            move_id,
            reference,
            axis,
            from,
            over: mov.middle(),
            to,
            occupancy: board.occupancy(),
        });
    }
    Ok(steps)
}

/// A recorded line of play on one board shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trace {
    pub board: BoardConfig,
    pub moves: Vec<(usize, Axis)>,
}

impl Trace {
    pub fn from_steps(board: BoardConfig, steps: &[TraceStep]) -> Self {
        Self {
            board,
            moves: steps.iter().map(|s| (s.reference, s.axis)).collect(),
        }
    }

    /// Re-run the recorded moves on a fresh board.
    pub fn replay(&self) -> Result<Vec<TraceStep>, TraceError> {
        replay(self.board, self.moves.iter().copied())
    }

    /// Serialize to the binary trace format.
    pub fn encode(&self) -> Result<Vec<u8>, TraceError> {
        // A valid board has side <= MAX_SIDE, so side, short edge and every
        // cell index fit the header and entry fields.
        self.board.validate()?;
        let side = self.board.side as u16;
        let short_edge = self.board.short_edge as u16;
        if self.moves.len() >= self.board.num_slots() {
            return Err(TraceError::TooManyMoves {
                count: self.moves.len(),
                slots: self.board.num_slots(),
            });
        }
        let count = self.moves.len() as u32;

        let mut data = Vec::with_capacity(self.moves.len() * ENTRY_SIZE);
        for &(reference, axis) in &self.moves {
            data.extend_from_slice(&(reference as u32).to_le_bytes());
            data.push(axis.code());
        }
        let checksum = xxh64(&data, 0);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&side.to_le_bytes());
        bytes.extend_from_slice(&short_edge.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&checksum.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 8]); // Reserved
        bytes.extend_from_slice(&data);
        Ok(bytes)
    }

    /// Parse the binary trace format.
    pub fn decode(bytes: &[u8]) -> Result<Self, TraceError> {
        if bytes.len() < HEADER_SIZE {
            return Err(TraceError::SizeMismatch {
                expected: HEADER_SIZE,
                found: bytes.len(),
            });
        }
        let (header, data) = bytes.split_at(HEADER_SIZE);

        if &header[0..4] != MAGIC {
            return Err(TraceError::BadMagic);
        }
        let version = read_u32(&header[4..8]);
        if version != VERSION {
            return Err(TraceError::UnsupportedVersion(version));
        }

        let side = usize::from(read_u16(&header[8..10]));
        let short_edge = usize::from(read_u16(&header[10..12]));
        let board = BoardConfig::new(side, short_edge)?;

        let count = read_u32(&header[12..16]) as usize;
        let stored_checksum = read_u64(&header[16..24]);
        // Every move removes a pin, and the start position holds one pin
        // fewer than there are slots.
        if count >= board.num_slots() {
            return Err(TraceError::TooManyMoves {
                count,
                slots: board.num_slots(),
            });
        }

        let expected = count * ENTRY_SIZE;
        if data.len() != expected {
            return Err(TraceError::SizeMismatch {
                expected: HEADER_SIZE + expected,
                found: bytes.len(),
            });
        }
        if xxh64(data, 0) != stored_checksum {
            return Err(TraceError::ChecksumMismatch);
        }

        let moves = data
            .chunks_exact(ENTRY_SIZE)
            .enumerate()
            .map(|(i, entry)| -> Result<(usize, Axis), TraceError> {
                let reference = read_u32(&entry[0..4]) as usize;
                let code = entry[4];
                let axis = Axis::from_code(code).ok_or(TraceError::UnknownAxis {
                    step: i + 1,
                    code,
                })?;
                Ok((reference, axis))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Trace { board, moves })
    }

    /// Write the trace file. Returns the number of moves saved.
    pub fn save(&self, path: &Path) -> Result<usize, TraceError> {
        let bytes = self.encode()?;
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(self.moves.len())
    }

    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), TraceError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Opening of the English solution found by the engine.
    fn opening() -> Trace {
        Trace {
            board: BoardConfig::english(),
            moves: vec![
                (10, Axis::Vertical),
                (15, Axis::Horizontal),
                (2, Axis::Vertical),
            ],
        }
    }

    #[test]
    fn test_replay_opening() {
        let steps = opening().replay().unwrap();
        assert_eq!(steps.len(), 3);

        // First pin jumps from 10 over 17 into the center.
        assert_eq!((steps[0].from, steps[0].over, steps[0].to), (10, 17, 24));
        assert!(steps[0].occupancy[24]);
        assert!(!steps[0].occupancy[10]);
        assert!(!steps[0].occupancy[17]);

        // Second move runs right to left into 17.
        assert_eq!((steps[1].from, steps[1].to), (15, 17));

        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.pins(), 31 - i);
        }
    }

    #[test]
    fn test_replay_rejects_illegal_move() {
        // 2, 3 and 4 all hold pins at the start: no end is free to land in.
        let err = replay(BoardConfig::english(), [(2, Axis::Horizontal)]).unwrap_err();
        assert!(matches!(
            err,
            TraceError::IllegalMove {
                step: 1,
                reference: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_replay_jumps_back_into_empty_reference() {
        // The center is the empty reference slot, so the pin on 38 jumps up
        // into it.
        let steps = replay(BoardConfig::english(), [(24, Axis::Vertical)]).unwrap();
        assert_eq!((steps[0].from, steps[0].over, steps[0].to), (38, 31, 24));
    }

    #[test]
    fn test_replay_rejects_unknown_move() {
        // Slot 0 is a cut corner.
        let err = replay(BoardConfig::english(), [(0, Axis::Horizontal)]).unwrap_err();
        assert!(matches!(err, TraceError::UnknownMove { step: 1, .. }));
    }

    #[test]
    fn test_trace_roundtrip() {
        let path = std::env::temp_dir().join("test_pegsol_trace.bin");

        let trace = opening();
        let saved = trace.save(&path).unwrap();
        assert_eq!(saved, 3);

        let loaded = Trace::load(&path).unwrap();
        assert_eq!(loaded, trace);
        assert_eq!(loaded.replay().unwrap(), trace.replay().unwrap());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_encoded_size() {
        let bytes = opening().encode().unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 3 * ENTRY_SIZE);
        assert_eq!(&bytes[0..4], b"PEGT");
    }

    #[test]
    fn test_decode_detects_corruption() {
        let mut bytes = opening().encode().unwrap();
        let last = bytes.len() - 2;
        bytes[last] ^= 0x01;
        assert!(matches!(
            Trace::decode(&bytes),
            Err(TraceError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_decode_rejects_bad_headers() {
        let bytes = opening().encode().unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(matches!(Trace::decode(&bad_magic), Err(TraceError::BadMagic)));

        let mut bad_version = bytes.clone();
        bad_version[4] = 9;
        assert!(matches!(
            Trace::decode(&bad_version),
            Err(TraceError::UnsupportedVersion(9))
        ));

        let mut bad_board = bytes.clone();
        bad_board[8] = 6;
        assert!(matches!(Trace::decode(&bad_board), Err(TraceError::Board(_))));

        assert!(matches!(
            Trace::decode(&bytes[..bytes.len() - 1]),
            Err(TraceError::SizeMismatch { .. })
        ));
        assert!(matches!(
            Trace::decode(&bytes[..10]),
            Err(TraceError::SizeMismatch { .. })
        ));
    }

    /// Header and entries as a writer would lay them out, with a valid checksum.
    fn raw_trace(side: u16, short_edge: u16, entries: &[(u32, u8)]) -> Vec<u8> {
        let mut data = Vec::new();
        for &(reference, code) in entries {
            data.extend_from_slice(&reference.to_le_bytes());
            data.push(code);
        }
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&side.to_le_bytes());
        bytes.extend_from_slice(&short_edge.to_le_bytes());
        bytes.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&xxh64(&data, 0).to_le_bytes());
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(&data);
        bytes
    }

    #[test]
    fn test_raw_trace_matches_encoder() {
        let entries = [(10, 1), (15, 0), (2, 1)];
        assert_eq!(raw_trace(7, 3, &entries), opening().encode().unwrap());
    }

    #[test]
    fn test_decode_rejects_huge_board() {
        // Would need a 65535 x 65535 grid if it got as far as a board.
        let bytes = raw_trace(65535, 3, &[]);
        assert!(matches!(
            Trace::decode(&bytes),
            Err(TraceError::Board(peg_core::ConfigError::SideTooLarge { side: 65535, .. }))
        ));
    }

    #[test]
    fn test_decode_rejects_more_moves_than_slots() {
        // English board: 33 slots, so at most 31 moves.
        let entries = vec![(10, 1); 33];
        assert!(matches!(
            Trace::decode(&raw_trace(7, 3, &entries)),
            Err(TraceError::TooManyMoves { count: 33, slots: 33 })
        ));

        // 32 moves pass the header checks and fail on replay instead.
        let entries = vec![(10, 1); 32];
        let trace = Trace::decode(&raw_trace(7, 3, &entries)).unwrap();
        assert!(matches!(
            trace.replay(),
            Err(TraceError::IllegalMove { step: 2, .. })
        ));
    }

    #[test]
    fn test_encode_rejects_invalid_board() {
        let trace = Trace {
            board: BoardConfig {
                side: 7,
                short_edge: 70_000,
            },
            moves: Vec::new(),
        };
        assert!(matches!(
            trace.encode(),
            Err(TraceError::Board(peg_core::ConfigError::SideTooSmall { .. }))
        ));

        let trace = Trace {
            board: BoardConfig {
                side: 70_001,
                short_edge: 3,
            },
            moves: Vec::new(),
        };
        assert!(matches!(
            trace.encode(),
            Err(TraceError::Board(peg_core::ConfigError::SideTooLarge { .. }))
        ));
    }

    #[test]
    fn test_empty_trace() {
        let trace = Trace {
            board: BoardConfig::english(),
            moves: Vec::new(),
        };
        let decoded = Trace::decode(&trace.encode().unwrap()).unwrap();
        assert_eq!(decoded, trace);
        assert!(decoded.replay().unwrap().is_empty());
    }

    #[test]
    fn test_write_json() {
        let path = std::env::temp_dir().join("test_pegsol_trace.json");
        let steps = opening().replay().unwrap();
        write_json(&path, &steps).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["from"], 10);
        assert_eq!(value[0]["axis"], "Vertical");

        std::fs::remove_file(&path).ok();
    }
}
