/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::path::Path;

use z80asm::file_reader::{AsmFileReader, MockFileReader};
use z80asm::printer::PrintOptions;
use z80asm::{assemble, assemble_str, emit, print};

#[test]
fn ld_a_b_assembles_to_a_single_byte() {
    let program = assemble_str("ld a, b\n", "t.z80").unwrap();
    assert_eq!(emit(&program), vec![0x78]);
}

#[test]
fn ld_bc_immediate_is_little_endian() {
    let program = assemble_str("ld bc, 0xdead\n", "t.z80").unwrap();
    assert_eq!(emit(&program), vec![0x01, 0xAD, 0xDE]);
}

#[test]
fn self_referential_jump_encodes_minus_two() {
    let program = assemble_str(".org 0x0000\nstart: jr start\n", "t.z80").unwrap();
    assert_eq!(emit(&program), vec![0x18, 0xFE]);
}

#[test]
fn forward_label_reference_resolves_through_layout() {
    let program = assemble_str("jp target\nnop\ntarget: halt\n", "t.z80").unwrap();
    let image = emit(&program);
    assert_eq!(&image[0..3], &[0xC3, 0x04, 0x00]);
    assert_eq!(image[4], 0x76);
}

#[test]
fn db_directive_mixes_strings_chars_and_ints() {
    let program = assemble_str(".db \"AB\", 'C', 1\n", "t.z80").unwrap();
    assert_eq!(emit(&program), vec![b'A', b'B', b'C', 1]);
}

#[test]
fn equ_constant_substitutes_into_an_immediate() {
    let program = assemble_str(".equ width, 0x10\nld a, width\n", "t.z80").unwrap();
    assert_eq!(emit(&program), vec![0x3E, 0x10]);
}

#[test]
fn undefined_label_is_reported_and_stops_the_pipeline() {
    let err = assemble_str("jp nowhere\n", "t.z80").unwrap_err();
    assert!(format!("{err:#}").contains("nowhere"));
}

#[test]
fn errors_across_multiple_lines_are_all_reported() {
    let err = assemble_str("frobnicate a, b\nalso_bad\n", "t.z80").unwrap_err();
    let rendered = format!("{err:#}");
    assert!(rendered.contains("t.z80"));
}

#[test]
fn listing_round_trips_through_assemble_and_print() {
    let program = assemble_str("start: ld a, 0x05\n halt\n", "t.z80").unwrap();
    let listing = print(&program, PrintOptions::default());
    assert!(listing.contains("start:"));
    assert!(listing.contains("ld a, 0x05"));
    assert!(listing.contains("halt"));
}

#[test]
fn assemble_reads_source_through_the_file_reader_abstraction() {
    let mut reader = MockFileReader::default();
    reader.add_file("program.z80", "nop\nhalt\n");

    let program = assemble(&reader, Path::new("program.z80")).unwrap();
    assert_eq!(emit(&program), vec![0x00, 0x76]);
}

#[test]
fn asm_file_reader_reads_a_real_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("program.z80");
    std::fs::write(&path, "ld a, 0x2a\nhalt\n").unwrap();

    let program = assemble(&AsmFileReader, &path).unwrap();
    assert_eq!(emit(&program), vec![0x3E, 0x2A, 0x76]);
}

#[test]
fn org_zero_fills_the_gap_it_jumps_over() {
    let program = assemble_str("nop\n.org 4\nhalt\n", "t.z80").unwrap();
    assert_eq!(emit(&program), vec![0x00, 0x00, 0x00, 0x00, 0x76]);
}

#[test]
fn out_of_range_relative_jump_is_an_error() {
    let mut src = String::from("start: nop\n");
    for _ in 0..200 {
        src.push_str("nop\n");
    }
    src.push_str("jr start\n");
    let err = assemble_str(&src, "t.z80").unwrap_err();
    let rendered = format!("{err:#}");
    assert!(rendered.contains("range") || rendered.contains("start"));
}
