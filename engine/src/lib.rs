//! cuecards Core Library
//!
//! Turns word-timed caption streams into short, sentence-aligned segments
//! suitable for sentence-mining flashcards.
//!
//! The library is organised like a classic pipeline:
//!
//! ```text
//! captions ──▶ timed words ──▶ annotator ──▶ boundary strings
//!                   │                              │
//!                   └──────────── aligner ◀────────┘
//!                                    │
//!                gap / comma / pause splitting ──▶ dedup ──▶ archive ──▶ margins
//! ```
//!
//! Everything lives under [`core`]; the CLI crate only wires inputs and outputs.

pub mod core;
