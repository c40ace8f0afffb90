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

//! The declarative mnemonic table: for each `Mnemonic`, the ordered list of
//! operand-shape alternatives it accepts and how each one encodes. This is
//! the single source of truth consulted by both the parser (to pick the
//! legal syntactic forms) and the layouter/compiler (for byte length and
//! encoding).
//!
//! Every alternative names a concrete tuple of `OperandKind`s (never a
//! union); register/register-pair/flag identity beyond that is carried by
//! the *resolved integer value* the parser already attaches to the operand
//! (its canonical bit-field code), so one alternative covers every member
//! of a register-parameterized family (all 49 `ld r,r'` combinations share
//! one alt, not 49). A handful of forms are legal only for a specific
//! register (e.g. `ld a,(bc)`); those carry a `guard` that inspects the
//! already-parsed operands and rejects the alternative for any other
//! register, which the dispatcher treats exactly like a failed parselet.

use crate::ast::{Mnemonic, Operand, OperandKind, Register, RegPair};
use crate::encoder::{split16, Encoding};

pub struct Alt {
    pub shape: &'static [OperandKind],
    pub guard: Option<fn(&[Operand]) -> bool>,
    pub encoding: Encoding,
}

fn is(op: &Operand, code: u8) -> bool {
    op.resolved_int() == Some(code as i32)
}

fn g0_a(ops: &[Operand]) -> bool {
    is(&ops[0], Register::A.code())
}
fn g1_a(ops: &[Operand]) -> bool {
    is(&ops[1], Register::A.code())
}
fn g0_hl(ops: &[Operand]) -> bool {
    is(&ops[0], RegPair::Hl.code())
}
fn g1_hl(ops: &[Operand]) -> bool {
    is(&ops[1], RegPair::Hl.code())
}
fn g1_not_hl(ops: &[Operand]) -> bool {
    !is(&ops[1], RegPair::Hl.code())
}
fn g0_not_hl(ops: &[Operand]) -> bool {
    !is(&ops[0], RegPair::Hl.code())
}
fn g0_sp(ops: &[Operand]) -> bool {
    is(&ops[0], RegPair::Sp.code())
}
fn g_jr_flag(ops: &[Operand]) -> bool {
    matches!(ops[0].resolved_int(), Some(v) if (0..=3).contains(&v))
}
fn g_disp_zero(ops: &[Operand]) -> bool {
    ops[0].resolved_int() == Some(0)
}

// ---- LD ------------------------------------------------------------------

fn enc_ld_r_r(a: &[i32]) -> Vec<u8> {
    vec![0x40 | ((a[0] as u8) << 3) | a[1] as u8]
}
fn enc_ld_r_n(a: &[i32]) -> Vec<u8> {
    vec![0x06 | ((a[0] as u8) << 3), a[1] as u8]
}
fn enc_ld_r_hl(a: &[i32]) -> Vec<u8> {
    vec![0x46 | ((a[0] as u8) << 3)]
}
fn enc_ld_hl_r(a: &[i32]) -> Vec<u8> {
    vec![0x70 | a[1] as u8]
}
fn enc_ld_hl_n(a: &[i32]) -> Vec<u8> {
    vec![0x36, a[1] as u8]
}
fn enc_ld_a_bc(_: &[i32]) -> Vec<u8> {
    vec![0x0A]
}
fn enc_ld_a_de(_: &[i32]) -> Vec<u8> {
    vec![0x1A]
}
fn enc_ld_bc_a(_: &[i32]) -> Vec<u8> {
    vec![0x02]
}
fn enc_ld_de_a(_: &[i32]) -> Vec<u8> {
    vec![0x12]
}
fn enc_ld_a_nn(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[1]);
    vec![0x3A, l, m]
}
fn enc_ld_nn_a(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[0]);
    vec![0x32, l, m]
}
fn enc_ld_dd_nn(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[1]);
    vec![0x01 | ((a[0] as u8) << 4), l, m]
}
fn enc_ld_ix_nn(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[1]);
    vec![0xDD, 0x21, l, m]
}
fn enc_ld_iy_nn(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[1]);
    vec![0xFD, 0x21, l, m]
}
fn enc_ld_hl_mem(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[1]);
    vec![0x2A, l, m]
}
fn enc_ld_dd_mem(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[1]);
    vec![0xED, 0x4B | ((a[0] as u8) << 4), l, m]
}
fn enc_ld_ix_mem(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[1]);
    vec![0xDD, 0x2A, l, m]
}
fn enc_ld_iy_mem(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[1]);
    vec![0xFD, 0x2A, l, m]
}
fn enc_ld_mem_hl(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[0]);
    vec![0x22, l, m]
}
fn enc_ld_mem_dd(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[0]);
    vec![0xED, 0x43 | ((a[1] as u8) << 4), l, m]
}
fn enc_ld_mem_ix(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[0]);
    vec![0xDD, 0x22, l, m]
}
fn enc_ld_mem_iy(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[0]);
    vec![0xFD, 0x22, l, m]
}
fn enc_ld_sp_hl(_: &[i32]) -> Vec<u8> {
    vec![0xF9]
}
fn enc_ld_sp_ix(_: &[i32]) -> Vec<u8> {
    vec![0xDD, 0xF9]
}
fn enc_ld_sp_iy(_: &[i32]) -> Vec<u8> {
    vec![0xFD, 0xF9]
}
fn enc_ld_r_ixd(a: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x46 | ((a[0] as u8) << 3), a[1] as u8]
}
fn enc_ld_r_iyd(a: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x46 | ((a[0] as u8) << 3), a[1] as u8]
}
fn enc_ld_ixd_r(a: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x70 | a[1] as u8, a[0] as u8]
}
fn enc_ld_iyd_r(a: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x70 | a[1] as u8, a[0] as u8]
}
fn enc_ld_ixd_n(a: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x36, a[0] as u8, a[1] as u8]
}
fn enc_ld_iyd_n(a: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x36, a[0] as u8, a[1] as u8]
}

static LD_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::Reg, OperandKind::Reg], guard: None, encoding: Encoding::Fn { len: 1, f: enc_ld_r_r } },
    Alt { shape: &[OperandKind::Reg, OperandKind::Int8], guard: None, encoding: Encoding::Fn { len: 2, f: enc_ld_r_n } },
    Alt { shape: &[OperandKind::Reg, OperandKind::Const], guard: None, encoding: Encoding::Fn { len: 2, f: enc_ld_r_n } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IndirectHl], guard: None, encoding: Encoding::Fn { len: 1, f: enc_ld_r_hl } },
    Alt { shape: &[OperandKind::IndirectHl, OperandKind::Reg], guard: None, encoding: Encoding::Fn { len: 1, f: enc_ld_hl_r } },
    Alt { shape: &[OperandKind::IndirectHl, OperandKind::Int8], guard: None, encoding: Encoding::Fn { len: 2, f: enc_ld_hl_n } },
    Alt { shape: &[OperandKind::IndirectHl, OperandKind::Const], guard: None, encoding: Encoding::Fn { len: 2, f: enc_ld_hl_n } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IndirectBc], guard: Some(g0_a), encoding: Encoding::Fn { len: 1, f: enc_ld_a_bc } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IndirectDe], guard: Some(g0_a), encoding: Encoding::Fn { len: 1, f: enc_ld_a_de } },
    Alt { shape: &[OperandKind::IndirectBc, OperandKind::Reg], guard: Some(g1_a), encoding: Encoding::Fn { len: 1, f: enc_ld_bc_a } },
    Alt { shape: &[OperandKind::IndirectDe, OperandKind::Reg], guard: Some(g1_a), encoding: Encoding::Fn { len: 1, f: enc_ld_de_a } },
    Alt { shape: &[OperandKind::Reg, OperandKind::Addr], guard: Some(g0_a), encoding: Encoding::Fn { len: 3, f: enc_ld_a_nn } },
    Alt { shape: &[OperandKind::Addr, OperandKind::Reg], guard: Some(g1_a), encoding: Encoding::Fn { len: 3, f: enc_ld_nn_a } },
    Alt { shape: &[OperandKind::RegPair, OperandKind::Int16], guard: None, encoding: Encoding::Fn { len: 3, f: enc_ld_dd_nn } },
    Alt { shape: &[OperandKind::RegPair, OperandKind::Const], guard: None, encoding: Encoding::Fn { len: 3, f: enc_ld_dd_nn } },
    Alt { shape: &[OperandKind::Ix, OperandKind::Int16], guard: None, encoding: Encoding::Fn { len: 4, f: enc_ld_ix_nn } },
    Alt { shape: &[OperandKind::Ix, OperandKind::Const], guard: None, encoding: Encoding::Fn { len: 4, f: enc_ld_ix_nn } },
    Alt { shape: &[OperandKind::Iy, OperandKind::Int16], guard: None, encoding: Encoding::Fn { len: 4, f: enc_ld_iy_nn } },
    Alt { shape: &[OperandKind::Iy, OperandKind::Const], guard: None, encoding: Encoding::Fn { len: 4, f: enc_ld_iy_nn } },
    Alt { shape: &[OperandKind::RegPair, OperandKind::Addr], guard: Some(g0_hl), encoding: Encoding::Fn { len: 3, f: enc_ld_hl_mem } },
    Alt { shape: &[OperandKind::RegPair, OperandKind::Addr], guard: Some(g0_not_hl), encoding: Encoding::Fn { len: 4, f: enc_ld_dd_mem } },
    Alt { shape: &[OperandKind::Ix, OperandKind::Addr], guard: None, encoding: Encoding::Fn { len: 4, f: enc_ld_ix_mem } },
    Alt { shape: &[OperandKind::Iy, OperandKind::Addr], guard: None, encoding: Encoding::Fn { len: 4, f: enc_ld_iy_mem } },
    Alt { shape: &[OperandKind::Addr, OperandKind::RegPair], guard: Some(g1_hl), encoding: Encoding::Fn { len: 3, f: enc_ld_mem_hl } },
    Alt { shape: &[OperandKind::Addr, OperandKind::RegPair], guard: Some(g1_not_hl), encoding: Encoding::Fn { len: 4, f: enc_ld_mem_dd } },
    Alt { shape: &[OperandKind::Addr, OperandKind::Ix], guard: None, encoding: Encoding::Fn { len: 4, f: enc_ld_mem_ix } },
    Alt { shape: &[OperandKind::Addr, OperandKind::Iy], guard: None, encoding: Encoding::Fn { len: 4, f: enc_ld_mem_iy } },
    Alt { shape: &[OperandKind::RegPair, OperandKind::RegPair], guard: Some(|o| is(&o[0], RegPair::Sp.code()) && is(&o[1], RegPair::Hl.code())), encoding: Encoding::Fn { len: 1, f: enc_ld_sp_hl } },
    Alt { shape: &[OperandKind::RegPair, OperandKind::Ix], guard: Some(g0_sp), encoding: Encoding::Fn { len: 2, f: enc_ld_sp_ix } },
    Alt { shape: &[OperandKind::RegPair, OperandKind::Iy], guard: Some(g0_sp), encoding: Encoding::Fn { len: 2, f: enc_ld_sp_iy } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IxdAddr], guard: None, encoding: Encoding::Fn { len: 3, f: enc_ld_r_ixd } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IydAddr], guard: None, encoding: Encoding::Fn { len: 3, f: enc_ld_r_iyd } },
    Alt { shape: &[OperandKind::IxdAddr, OperandKind::Reg], guard: None, encoding: Encoding::Fn { len: 3, f: enc_ld_ixd_r } },
    Alt { shape: &[OperandKind::IydAddr, OperandKind::Reg], guard: None, encoding: Encoding::Fn { len: 3, f: enc_ld_iyd_r } },
    Alt { shape: &[OperandKind::IxdAddr, OperandKind::Int8], guard: None, encoding: Encoding::Fn { len: 4, f: enc_ld_ixd_n } },
    Alt { shape: &[OperandKind::IydAddr, OperandKind::Int8], guard: None, encoding: Encoding::Fn { len: 4, f: enc_ld_iyd_n } },
];

// ---- PUSH / POP -----------------------------------------------------------

fn enc_push_qq(a: &[i32]) -> Vec<u8> {
    vec![0xC5 | ((a[0] as u8) << 4)]
}
fn enc_push_af(_: &[i32]) -> Vec<u8> {
    vec![0xF5]
}
fn enc_push_ix(_: &[i32]) -> Vec<u8> {
    vec![0xDD, 0xE5]
}
fn enc_push_iy(_: &[i32]) -> Vec<u8> {
    vec![0xFD, 0xE5]
}
fn enc_pop_qq(a: &[i32]) -> Vec<u8> {
    vec![0xC1 | ((a[0] as u8) << 4)]
}
fn enc_pop_af(_: &[i32]) -> Vec<u8> {
    vec![0xF1]
}
fn enc_pop_ix(_: &[i32]) -> Vec<u8> {
    vec![0xDD, 0xE1]
}
fn enc_pop_iy(_: &[i32]) -> Vec<u8> {
    vec![0xFD, 0xE1]
}

fn g0_not_sp(ops: &[Operand]) -> bool {
    !is(&ops[0], RegPair::Sp.code())
}

static PUSH_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::RegPair], guard: Some(g0_not_sp), encoding: Encoding::Fn { len: 1, f: enc_push_qq } },
    Alt { shape: &[OperandKind::Af], guard: None, encoding: Encoding::Fn { len: 1, f: enc_push_af } },
    Alt { shape: &[OperandKind::Ix], guard: None, encoding: Encoding::Fn { len: 2, f: enc_push_ix } },
    Alt { shape: &[OperandKind::Iy], guard: None, encoding: Encoding::Fn { len: 2, f: enc_push_iy } },
];
static POP_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::RegPair], guard: Some(g0_not_sp), encoding: Encoding::Fn { len: 1, f: enc_pop_qq } },
    Alt { shape: &[OperandKind::Af], guard: None, encoding: Encoding::Fn { len: 1, f: enc_pop_af } },
    Alt { shape: &[OperandKind::Ix], guard: None, encoding: Encoding::Fn { len: 2, f: enc_pop_ix } },
    Alt { shape: &[OperandKind::Iy], guard: None, encoding: Encoding::Fn { len: 2, f: enc_pop_iy } },
];

// ---- EX / EXX --------------------------------------------------------------

fn enc_ex_de_hl(_: &[i32]) -> Vec<u8> {
    vec![0xEB]
}
fn enc_ex_af_af(_: &[i32]) -> Vec<u8> {
    vec![0x08]
}
fn enc_ex_sp_hl(_: &[i32]) -> Vec<u8> {
    vec![0xE3]
}
fn enc_ex_sp_ix(_: &[i32]) -> Vec<u8> {
    vec![0xDD, 0xE3]
}
fn enc_ex_sp_iy(_: &[i32]) -> Vec<u8> {
    vec![0xFD, 0xE3]
}

static EX_ALTS: &[Alt] = &[
    Alt {
        shape: &[OperandKind::RegPair, OperandKind::RegPair],
        guard: Some(|o| is(&o[0], RegPair::De.code()) && is(&o[1], RegPair::Hl.code())),
        encoding: Encoding::Fn { len: 1, f: enc_ex_de_hl },
    },
    Alt { shape: &[OperandKind::Af, OperandKind::Af], guard: None, encoding: Encoding::Fn { len: 1, f: enc_ex_af_af } },
    Alt {
        shape: &[OperandKind::IndirectSp, OperandKind::RegPair],
        guard: Some(g1_hl),
        encoding: Encoding::Fn { len: 1, f: enc_ex_sp_hl },
    },
    Alt { shape: &[OperandKind::IndirectSp, OperandKind::Ix], guard: None, encoding: Encoding::Fn { len: 2, f: enc_ex_sp_ix } },
    Alt { shape: &[OperandKind::IndirectSp, OperandKind::Iy], guard: None, encoding: Encoding::Fn { len: 2, f: enc_ex_sp_iy } },
];
static EXX_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xD9]) }];

// ---- block transfer / search ----------------------------------------------

static LDI_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xA0]) }];
static LDIR_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xB0]) }];
static LDD_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xA8]) }];
static LDDR_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xB8]) }];
static CPI_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xA1]) }];
static CPIR_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xB1]) }];
static CPD_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xA9]) }];
static CPDR_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xB9]) }];

// ---- ALU group --------------------------------------------------------------

fn enc_alu_r(base: u8, a: &[i32]) -> Vec<u8> {
    vec![base | a[0] as u8]
}
fn enc_alu_n(opc: u8, a: &[i32]) -> Vec<u8> {
    vec![opc, a[0] as u8]
}
fn enc_alu_hl(opc: u8) -> Vec<u8> {
    vec![opc]
}
fn enc_alu_ixd(opc: u8, a: &[i32]) -> Vec<u8> {
    vec![0xDD, opc, a[0] as u8]
}
fn enc_alu_iyd(opc: u8, a: &[i32]) -> Vec<u8> {
    vec![0xFD, opc, a[0] as u8]
}

macro_rules! alu_family {
    ($alts:ident, $r_base:expr, $n_opc:expr, $hl_opc:expr, $ixd_opc:expr, $iyd_opc:expr, $r_fn:ident, $n_fn:ident, $hl_fn:ident, $ixd_fn:ident, $iyd_fn:ident) => {
        fn $r_fn(a: &[i32]) -> Vec<u8> {
            enc_alu_r($r_base, a)
        }
        fn $n_fn(a: &[i32]) -> Vec<u8> {
            enc_alu_n($n_opc, a)
        }
        fn $hl_fn(_: &[i32]) -> Vec<u8> {
            enc_alu_hl($hl_opc)
        }
        fn $ixd_fn(a: &[i32]) -> Vec<u8> {
            enc_alu_ixd($ixd_opc, a)
        }
        fn $iyd_fn(a: &[i32]) -> Vec<u8> {
            enc_alu_iyd($iyd_opc, a)
        }
        static $alts: &[Alt] = &[
            Alt { shape: &[OperandKind::Reg], guard: None, encoding: Encoding::Fn { len: 1, f: $r_fn } },
            Alt { shape: &[OperandKind::Int8], guard: None, encoding: Encoding::Fn { len: 2, f: $n_fn } },
            Alt { shape: &[OperandKind::Const], guard: None, encoding: Encoding::Fn { len: 2, f: $n_fn } },
            Alt { shape: &[OperandKind::IndirectHl], guard: None, encoding: Encoding::Fn { len: 1, f: $hl_fn } },
            Alt { shape: &[OperandKind::IxdAddr], guard: None, encoding: Encoding::Fn { len: 3, f: $ixd_fn } },
            Alt { shape: &[OperandKind::IydAddr], guard: None, encoding: Encoding::Fn { len: 3, f: $iyd_fn } },
        ];
    };
}

alu_family!(SUB_ALTS, 0x90, 0xD6, 0x96, 0x96, 0x96, enc_sub_r, enc_sub_n, enc_sub_hl, enc_sub_ixd, enc_sub_iyd);
alu_family!(AND_ALTS, 0xA0, 0xE6, 0xA6, 0xA6, 0xA6, enc_and_r, enc_and_n, enc_and_hl, enc_and_ixd, enc_and_iyd);
alu_family!(OR_ALTS, 0xB0, 0xF6, 0xB6, 0xB6, 0xB6, enc_or_r, enc_or_n, enc_or_hl, enc_or_ixd, enc_or_iyd);
alu_family!(XOR_ALTS, 0xA8, 0xEE, 0xAE, 0xAE, 0xAE, enc_xor_r, enc_xor_n, enc_xor_hl, enc_xor_ixd, enc_xor_iyd);
alu_family!(CP_ALTS, 0xB8, 0xFE, 0xBE, 0xBE, 0xBE, enc_cp_r, enc_cp_n, enc_cp_hl, enc_cp_ixd, enc_cp_iyd);

fn enc_add_a_r(a: &[i32]) -> Vec<u8> {
    vec![0x80 | a[1] as u8]
}
fn enc_add_a_n(a: &[i32]) -> Vec<u8> {
    vec![0xC6, a[1] as u8]
}
fn enc_add_a_hl(_: &[i32]) -> Vec<u8> {
    vec![0x86]
}
fn enc_add_a_ixd(a: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x86, a[1] as u8]
}
fn enc_add_a_iyd(a: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x86, a[1] as u8]
}
fn enc_add_hl_ss(a: &[i32]) -> Vec<u8> {
    vec![0x09 | ((a[1] as u8) << 4)]
}
fn enc_add_ix_pp(a: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x09 | ((a[1] as u8) << 4)]
}
fn enc_add_ix_ix(_: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x29]
}
fn enc_add_iy_rr(a: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x09 | ((a[1] as u8) << 4)]
}
fn enc_add_iy_iy(_: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x29]
}

static ADD_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::Reg, OperandKind::Reg], guard: Some(g0_a), encoding: Encoding::Fn { len: 1, f: enc_add_a_r } },
    Alt { shape: &[OperandKind::Reg, OperandKind::Int8], guard: Some(g0_a), encoding: Encoding::Fn { len: 2, f: enc_add_a_n } },
    Alt { shape: &[OperandKind::Reg, OperandKind::Const], guard: Some(g0_a), encoding: Encoding::Fn { len: 2, f: enc_add_a_n } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IndirectHl], guard: Some(g0_a), encoding: Encoding::Fn { len: 1, f: enc_add_a_hl } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IxdAddr], guard: Some(g0_a), encoding: Encoding::Fn { len: 3, f: enc_add_a_ixd } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IydAddr], guard: Some(g0_a), encoding: Encoding::Fn { len: 3, f: enc_add_a_iyd } },
    Alt { shape: &[OperandKind::RegPair, OperandKind::RegPair], guard: Some(g0_hl), encoding: Encoding::Fn { len: 1, f: enc_add_hl_ss } },
    Alt { shape: &[OperandKind::Ix, OperandKind::RegPair], guard: Some(g1_not_hl), encoding: Encoding::Fn { len: 2, f: enc_add_ix_pp } },
    Alt { shape: &[OperandKind::Ix, OperandKind::Ix], guard: None, encoding: Encoding::Fn { len: 2, f: enc_add_ix_ix } },
    Alt { shape: &[OperandKind::Iy, OperandKind::RegPair], guard: Some(g1_not_hl), encoding: Encoding::Fn { len: 2, f: enc_add_iy_rr } },
    Alt { shape: &[OperandKind::Iy, OperandKind::Iy], guard: None, encoding: Encoding::Fn { len: 2, f: enc_add_iy_iy } },
];

fn enc_adc_a_r(a: &[i32]) -> Vec<u8> {
    vec![0x88 | a[1] as u8]
}
fn enc_adc_a_n(a: &[i32]) -> Vec<u8> {
    vec![0xCE, a[1] as u8]
}
fn enc_adc_a_hl(_: &[i32]) -> Vec<u8> {
    vec![0x8E]
}
fn enc_adc_a_ixd(a: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x8E, a[1] as u8]
}
fn enc_adc_a_iyd(a: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x8E, a[1] as u8]
}
fn enc_adc_hl_ss(a: &[i32]) -> Vec<u8> {
    vec![0xED, 0x4A | ((a[1] as u8) << 4)]
}
static ADC_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::Reg, OperandKind::Reg], guard: Some(g0_a), encoding: Encoding::Fn { len: 1, f: enc_adc_a_r } },
    Alt { shape: &[OperandKind::Reg, OperandKind::Int8], guard: Some(g0_a), encoding: Encoding::Fn { len: 2, f: enc_adc_a_n } },
    Alt { shape: &[OperandKind::Reg, OperandKind::Const], guard: Some(g0_a), encoding: Encoding::Fn { len: 2, f: enc_adc_a_n } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IndirectHl], guard: Some(g0_a), encoding: Encoding::Fn { len: 1, f: enc_adc_a_hl } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IxdAddr], guard: Some(g0_a), encoding: Encoding::Fn { len: 3, f: enc_adc_a_ixd } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IydAddr], guard: Some(g0_a), encoding: Encoding::Fn { len: 3, f: enc_adc_a_iyd } },
    Alt { shape: &[OperandKind::RegPair, OperandKind::RegPair], guard: Some(g0_hl), encoding: Encoding::Fn { len: 2, f: enc_adc_hl_ss } },
];

fn enc_sbc_a_r(a: &[i32]) -> Vec<u8> {
    vec![0x98 | a[1] as u8]
}
fn enc_sbc_a_n(a: &[i32]) -> Vec<u8> {
    vec![0xDE, a[1] as u8]
}
fn enc_sbc_a_hl(_: &[i32]) -> Vec<u8> {
    vec![0x9E]
}
fn enc_sbc_a_ixd(a: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x9E, a[1] as u8]
}
fn enc_sbc_a_iyd(a: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x9E, a[1] as u8]
}
fn enc_sbc_hl_ss(a: &[i32]) -> Vec<u8> {
    vec![0xED, 0x42 | ((a[1] as u8) << 4)]
}
static SBC_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::Reg, OperandKind::Reg], guard: Some(g0_a), encoding: Encoding::Fn { len: 1, f: enc_sbc_a_r } },
    Alt { shape: &[OperandKind::Reg, OperandKind::Int8], guard: Some(g0_a), encoding: Encoding::Fn { len: 2, f: enc_sbc_a_n } },
    Alt { shape: &[OperandKind::Reg, OperandKind::Const], guard: Some(g0_a), encoding: Encoding::Fn { len: 2, f: enc_sbc_a_n } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IndirectHl], guard: Some(g0_a), encoding: Encoding::Fn { len: 1, f: enc_sbc_a_hl } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IxdAddr], guard: Some(g0_a), encoding: Encoding::Fn { len: 3, f: enc_sbc_a_ixd } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IydAddr], guard: Some(g0_a), encoding: Encoding::Fn { len: 3, f: enc_sbc_a_iyd } },
    Alt { shape: &[OperandKind::RegPair, OperandKind::RegPair], guard: Some(g0_hl), encoding: Encoding::Fn { len: 2, f: enc_sbc_hl_ss } },
];

// ---- INC / DEC --------------------------------------------------------------

fn enc_inc_r(a: &[i32]) -> Vec<u8> {
    vec![0x04 | ((a[0] as u8) << 3)]
}
fn enc_inc_hl_ind(_: &[i32]) -> Vec<u8> {
    vec![0x34]
}
fn enc_inc_ss(a: &[i32]) -> Vec<u8> {
    vec![0x03 | ((a[0] as u8) << 4)]
}
fn enc_inc_ix(_: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x23]
}
fn enc_inc_iy(_: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x23]
}
fn enc_inc_ixd(a: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x34, a[0] as u8]
}
fn enc_inc_iyd(a: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x34, a[0] as u8]
}
static INC_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::Reg], guard: None, encoding: Encoding::Fn { len: 1, f: enc_inc_r } },
    Alt { shape: &[OperandKind::IndirectHl], guard: None, encoding: Encoding::Fn { len: 1, f: enc_inc_hl_ind } },
    Alt { shape: &[OperandKind::RegPair], guard: None, encoding: Encoding::Fn { len: 1, f: enc_inc_ss } },
    Alt { shape: &[OperandKind::Ix], guard: None, encoding: Encoding::Fn { len: 2, f: enc_inc_ix } },
    Alt { shape: &[OperandKind::Iy], guard: None, encoding: Encoding::Fn { len: 2, f: enc_inc_iy } },
    Alt { shape: &[OperandKind::IxdAddr], guard: None, encoding: Encoding::Fn { len: 3, f: enc_inc_ixd } },
    Alt { shape: &[OperandKind::IydAddr], guard: None, encoding: Encoding::Fn { len: 3, f: enc_inc_iyd } },
];

fn enc_dec_r(a: &[i32]) -> Vec<u8> {
    vec![0x05 | ((a[0] as u8) << 3)]
}
fn enc_dec_hl_ind(_: &[i32]) -> Vec<u8> {
    vec![0x35]
}
fn enc_dec_ss(a: &[i32]) -> Vec<u8> {
    vec![0x0B | ((a[0] as u8) << 4)]
}
fn enc_dec_ix(_: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x2B]
}
fn enc_dec_iy(_: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x2B]
}
fn enc_dec_ixd(a: &[i32]) -> Vec<u8> {
    vec![0xDD, 0x35, a[0] as u8]
}
fn enc_dec_iyd(a: &[i32]) -> Vec<u8> {
    vec![0xFD, 0x35, a[0] as u8]
}
static DEC_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::Reg], guard: None, encoding: Encoding::Fn { len: 1, f: enc_dec_r } },
    Alt { shape: &[OperandKind::IndirectHl], guard: None, encoding: Encoding::Fn { len: 1, f: enc_dec_hl_ind } },
    Alt { shape: &[OperandKind::RegPair], guard: None, encoding: Encoding::Fn { len: 1, f: enc_dec_ss } },
    Alt { shape: &[OperandKind::Ix], guard: None, encoding: Encoding::Fn { len: 2, f: enc_dec_ix } },
    Alt { shape: &[OperandKind::Iy], guard: None, encoding: Encoding::Fn { len: 2, f: enc_dec_iy } },
    Alt { shape: &[OperandKind::IxdAddr], guard: None, encoding: Encoding::Fn { len: 3, f: enc_dec_ixd } },
    Alt { shape: &[OperandKind::IydAddr], guard: None, encoding: Encoding::Fn { len: 3, f: enc_dec_iyd } },
];

// ---- misc single-byte / fixed instructions ---------------------------------

static DAA_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0x27]) }];
static CPL_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0x2F]) }];
static NEG_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0x44]) }];
static CCF_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0x3F]) }];
static SCF_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0x37]) }];
static NOP_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0x00]) }];
static HALT_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0x76]) }];
static DI_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xF3]) }];
static EI_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xFB]) }];

fn enc_im(a: &[i32]) -> Vec<u8> {
    match a[0] {
        0 => vec![0xED, 0x46],
        1 => vec![0xED, 0x56],
        _ => vec![0xED, 0x5E],
    }
}
fn g_im_mode(ops: &[Operand]) -> bool {
    matches!(ops[0].resolved_int(), Some(0) | Some(1) | Some(2))
}
static IM_ALTS: &[Alt] = &[Alt { shape: &[OperandKind::Int8], guard: Some(g_im_mode), encoding: Encoding::Fn { len: 2, f: enc_im } }];

static RLCA_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0x07]) }];
static RLA_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0x17]) }];
static RRCA_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0x0F]) }];
static RRA_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0x1F]) }];

// ---- CB-prefixed rotate / shift group ---------------------------------------

macro_rules! cb_family {
    ($alts:ident, $base:expr, $r_fn:ident, $hl_fn:ident, $ixd_fn:ident, $iyd_fn:ident) => {
        fn $r_fn(a: &[i32]) -> Vec<u8> {
            vec![0xCB, $base | a[0] as u8]
        }
        fn $hl_fn(_: &[i32]) -> Vec<u8> {
            vec![0xCB, $base | 0b110]
        }
        fn $ixd_fn(a: &[i32]) -> Vec<u8> {
            vec![0xDD, 0xCB, a[0] as u8, $base | 0b110]
        }
        fn $iyd_fn(a: &[i32]) -> Vec<u8> {
            vec![0xFD, 0xCB, a[0] as u8, $base | 0b110]
        }
        static $alts: &[Alt] = &[
            Alt { shape: &[OperandKind::Reg], guard: None, encoding: Encoding::Fn { len: 2, f: $r_fn } },
            Alt { shape: &[OperandKind::IndirectHl], guard: None, encoding: Encoding::Fn { len: 2, f: $hl_fn } },
            Alt { shape: &[OperandKind::IxdAddr], guard: None, encoding: Encoding::Fn { len: 4, f: $ixd_fn } },
            Alt { shape: &[OperandKind::IydAddr], guard: None, encoding: Encoding::Fn { len: 4, f: $iyd_fn } },
        ];
    };
}

cb_family!(RLC_ALTS, 0x00, enc_rlc_r, enc_rlc_hl, enc_rlc_ixd, enc_rlc_iyd);
cb_family!(RL_ALTS, 0x10, enc_rl_r, enc_rl_hl, enc_rl_ixd, enc_rl_iyd);
cb_family!(RRC_ALTS, 0x08, enc_rrc_r, enc_rrc_hl, enc_rrc_ixd, enc_rrc_iyd);
// RR must not collide with RRC (0xCB,0x08|r): canonical encoding is 0xCB,0x18|r.
cb_family!(RR_ALTS, 0x18, enc_rr_r, enc_rr_hl, enc_rr_ixd, enc_rr_iyd);
cb_family!(SLA_ALTS, 0x20, enc_sla_r, enc_sla_hl, enc_sla_ixd, enc_sla_iyd);
cb_family!(SRA_ALTS, 0x28, enc_sra_r, enc_sra_hl, enc_sra_ixd, enc_sra_iyd);
cb_family!(SRL_ALTS, 0x38, enc_srl_r, enc_srl_hl, enc_srl_ixd, enc_srl_iyd);

static RLD_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0x6F]) }];
static RRD_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0x67]) }];

// ---- BIT / SET / RES --------------------------------------------------------

macro_rules! bit_family {
    ($alts:ident, $base:expr, $r_fn:ident, $hl_fn:ident, $ixd_fn:ident, $iyd_fn:ident) => {
        fn $r_fn(a: &[i32]) -> Vec<u8> {
            vec![0xCB, $base | ((a[0] as u8) << 3) | a[1] as u8]
        }
        fn $hl_fn(a: &[i32]) -> Vec<u8> {
            vec![0xCB, $base | ((a[0] as u8) << 3) | 0b110]
        }
        fn $ixd_fn(a: &[i32]) -> Vec<u8> {
            vec![0xDD, 0xCB, a[1] as u8, $base | ((a[0] as u8) << 3) | 0b110]
        }
        fn $iyd_fn(a: &[i32]) -> Vec<u8> {
            vec![0xFD, 0xCB, a[1] as u8, $base | ((a[0] as u8) << 3) | 0b110]
        }
        static $alts: &[Alt] = &[
            Alt { shape: &[OperandKind::BitPos, OperandKind::Reg], guard: None, encoding: Encoding::Fn { len: 2, f: $r_fn } },
            Alt { shape: &[OperandKind::BitPos, OperandKind::IndirectHl], guard: None, encoding: Encoding::Fn { len: 2, f: $hl_fn } },
            Alt { shape: &[OperandKind::BitPos, OperandKind::IxdAddr], guard: None, encoding: Encoding::Fn { len: 4, f: $ixd_fn } },
            Alt { shape: &[OperandKind::BitPos, OperandKind::IydAddr], guard: None, encoding: Encoding::Fn { len: 4, f: $iyd_fn } },
        ];
    };
}

bit_family!(BIT_ALTS, 0x40, enc_bit_r, enc_bit_hl, enc_bit_ixd, enc_bit_iyd);
bit_family!(SET_ALTS, 0xC0, enc_set_r, enc_set_hl, enc_set_ixd, enc_set_iyd);
bit_family!(RES_ALTS, 0x80, enc_res_r, enc_res_hl, enc_res_ixd, enc_res_iyd);

// ---- jumps / calls / returns -------------------------------------------------

fn enc_jp_nn(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[0]);
    vec![0xC3, l, m]
}
fn enc_jp_cc_nn(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[1]);
    vec![0xC2 | ((a[0] as u8) << 3), l, m]
}
fn enc_jp_hl(_: &[i32]) -> Vec<u8> {
    vec![0xE9]
}
fn enc_jp_ix(_: &[i32]) -> Vec<u8> {
    vec![0xDD, 0xE9]
}
fn enc_jp_iy(_: &[i32]) -> Vec<u8> {
    vec![0xFD, 0xE9]
}
static JP_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::AbsLabel], guard: None, encoding: Encoding::Fn { len: 3, f: enc_jp_nn } },
    Alt { shape: &[OperandKind::Flag, OperandKind::AbsLabel], guard: None, encoding: Encoding::Fn { len: 3, f: enc_jp_cc_nn } },
    Alt { shape: &[OperandKind::IndirectHl], guard: None, encoding: Encoding::Fn { len: 1, f: enc_jp_hl } },
    Alt { shape: &[OperandKind::IxdAddr], guard: Some(g_disp_zero), encoding: Encoding::Fn { len: 2, f: enc_jp_ix } },
    Alt { shape: &[OperandKind::IydAddr], guard: Some(g_disp_zero), encoding: Encoding::Fn { len: 2, f: enc_jp_iy } },
];

/// The layouter stores `d = T - A` (target minus the jump instruction's own
/// address); the instruction's own length (2 bytes) is subtracted here, at
/// the last possible moment, to get the hardware-correct signed offset.
fn rel_byte(d: i32) -> u8 {
    ((d - 2) & 0xFF) as u8
}

fn enc_jr_e(a: &[i32]) -> Vec<u8> {
    vec![0x18, rel_byte(a[0])]
}
fn enc_jr_cc_e(a: &[i32]) -> Vec<u8> {
    vec![0x20 | ((a[0] as u8) << 3), rel_byte(a[1])]
}
static JR_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::RelLabel], guard: None, encoding: Encoding::Fn { len: 2, f: enc_jr_e } },
    Alt { shape: &[OperandKind::Flag, OperandKind::RelLabel], guard: Some(g_jr_flag), encoding: Encoding::Fn { len: 2, f: enc_jr_cc_e } },
];

fn enc_djnz(a: &[i32]) -> Vec<u8> {
    vec![0x10, rel_byte(a[0])]
}
static DJNZ_ALTS: &[Alt] = &[Alt { shape: &[OperandKind::RelLabel], guard: None, encoding: Encoding::Fn { len: 2, f: enc_djnz } }];

fn enc_call_nn(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[0]);
    vec![0xCD, l, m]
}
fn enc_call_cc_nn(a: &[i32]) -> Vec<u8> {
    let (l, m) = split16(a[1]);
    vec![0xC4 | ((a[0] as u8) << 3), l, m]
}
static CALL_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::AbsLabel], guard: None, encoding: Encoding::Fn { len: 3, f: enc_call_nn } },
    Alt { shape: &[OperandKind::Flag, OperandKind::AbsLabel], guard: None, encoding: Encoding::Fn { len: 3, f: enc_call_cc_nn } },
];

static RET_ALTS: &[Alt] = &[
    Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xC9]) },
    Alt {
        shape: &[OperandKind::Flag],
        guard: None,
        encoding: Encoding::Fn { len: 1, f: |a| vec![0xC0 | ((a[0] as u8) << 3)] },
    },
];
static RETI_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0x4D]) }];
static RETN_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0x45]) }];

fn enc_rst(a: &[i32]) -> Vec<u8> {
    vec![0xC7 | ((a[0] as u8 >> 3) << 3)]
}
static RST_ALTS: &[Alt] = &[Alt { shape: &[OperandKind::MemLoc], guard: None, encoding: Encoding::Fn { len: 1, f: enc_rst } }];

// ---- I/O ---------------------------------------------------------------------

fn enc_in_a_n(a: &[i32]) -> Vec<u8> {
    vec![0xDB, a[1] as u8]
}
fn enc_in_r_c(a: &[i32]) -> Vec<u8> {
    vec![0xED, 0x40 | ((a[0] as u8) << 3)]
}
static IN_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::Reg, OperandKind::IoAddr], guard: Some(g0_a), encoding: Encoding::Fn { len: 2, f: enc_in_a_n } },
    Alt { shape: &[OperandKind::Reg, OperandKind::IoC], guard: None, encoding: Encoding::Fn { len: 2, f: enc_in_r_c } },
];

static INI_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xA2]) }];
static INIR_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xB2]) }];
static IND_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xAA]) }];
static INDR_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xBA]) }];

fn enc_out_n_a(a: &[i32]) -> Vec<u8> {
    vec![0xD3, a[0] as u8]
}
fn enc_out_c_r(a: &[i32]) -> Vec<u8> {
    vec![0xED, 0x41 | ((a[1] as u8) << 3)]
}
static OUT_ALTS: &[Alt] = &[
    Alt { shape: &[OperandKind::IoAddr, OperandKind::Reg], guard: Some(g1_a), encoding: Encoding::Fn { len: 2, f: enc_out_n_a } },
    Alt { shape: &[OperandKind::IoC, OperandKind::Reg], guard: None, encoding: Encoding::Fn { len: 2, f: enc_out_c_r } },
];

static OUTI_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xA3]) }];
static OTIR_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xB3]) }];
static OUTD_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xAB]) }];
static OTDR_ALTS: &[Alt] = &[Alt { shape: &[], guard: None, encoding: Encoding::Fixed(&[0xED, 0xBB]) }];

/// Re-derive the alternative a statement's operands belong to, purely from
/// each operand's `kind` (never its value) plus any guard. Used by the
/// layouter (for `length`) and the compiler (for the encoder) once operands
/// are resolved; the parser uses `dispatch` in `parser::mnemonics` instead,
/// since it must *produce* the operand list, not just match an existing one.
pub fn find_alt(m: Mnemonic, operands: &[Operand]) -> Option<&'static Alt> {
    alts_for(m).iter().find(|alt| {
        alt.shape.len() == operands.len()
            && alt.shape.iter().zip(operands).all(|(k, o)| *k == o.kind)
            && alt.guard.map_or(true, |g| g(operands))
    })
}

/// Look up every operand-shape alternative accepted by `m`, in declaration
/// order — the order the parser tries them in.
pub fn alts_for(m: Mnemonic) -> &'static [Alt] {
    use Mnemonic::*;
    match m {
        Ld => LD_ALTS,
        Push => PUSH_ALTS,
        Pop => POP_ALTS,
        Ex => EX_ALTS,
        Exx => EXX_ALTS,
        Ldi => LDI_ALTS,
        Ldir => LDIR_ALTS,
        Ldd => LDD_ALTS,
        Lddr => LDDR_ALTS,
        Cpi => CPI_ALTS,
        Cpir => CPIR_ALTS,
        Cpd => CPD_ALTS,
        Cpdr => CPDR_ALTS,
        Add => ADD_ALTS,
        Adc => ADC_ALTS,
        Sub => SUB_ALTS,
        Sbc => SBC_ALTS,
        And => AND_ALTS,
        Or => OR_ALTS,
        Xor => XOR_ALTS,
        Cp => CP_ALTS,
        Inc => INC_ALTS,
        Dec => DEC_ALTS,
        Daa => DAA_ALTS,
        Cpl => CPL_ALTS,
        Neg => NEG_ALTS,
        Ccf => CCF_ALTS,
        Scf => SCF_ALTS,
        Nop => NOP_ALTS,
        Halt => HALT_ALTS,
        Di => DI_ALTS,
        Ei => EI_ALTS,
        Im => IM_ALTS,
        Rlca => RLCA_ALTS,
        Rla => RLA_ALTS,
        Rrca => RRCA_ALTS,
        Rra => RRA_ALTS,
        Rlc => RLC_ALTS,
        Rl => RL_ALTS,
        Rrc => RRC_ALTS,
        Rr => RR_ALTS,
        Sla => SLA_ALTS,
        Sra => SRA_ALTS,
        Srl => SRL_ALTS,
        Rld => RLD_ALTS,
        Rrd => RRD_ALTS,
        Bit => BIT_ALTS,
        Set => SET_ALTS,
        Res => RES_ALTS,
        Jp => JP_ALTS,
        Jr => JR_ALTS,
        Djnz => DJNZ_ALTS,
        Call => CALL_ALTS,
        Ret => RET_ALTS,
        Reti => RETI_ALTS,
        Retn => RETN_ALTS,
        Rst => RST_ALTS,
        In => IN_ALTS,
        Ini => INI_ALTS,
        Inir => INIR_ALTS,
        Ind => IND_ALTS,
        Indr => INDR_ALTS,
        Out => OUT_ALTS,
        Outi => OUTI_ALTS,
        Otir => OTIR_ALTS,
        Outd => OUTD_ALTS,
        Otdr => OTDR_ALTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourcePos;

    fn op(kind: OperandKind, v: i32) -> Operand {
        Operand::int(kind, v, SourcePos::dummy())
    }

    #[test]
    fn ld_a_b_encodes_to_0x78() {
        let alts = alts_for(Mnemonic::Ld);
        let operands = vec![op(OperandKind::Reg, Register::A.code() as i32), op(OperandKind::Reg, Register::B.code() as i32)];
        let alt = &alts[0];
        assert_eq!(alt.encoding.encode(&operands.iter().map(|o| o.resolved_int().unwrap()).collect::<Vec<_>>()), vec![0x78]);
    }

    #[test]
    fn ld_bc_nn_encodes_little_endian() {
        let alts = alts_for(Mnemonic::Ld);
        let alt = alts.iter().find(|a| a.shape == [OperandKind::RegPair, OperandKind::Int16]).unwrap();
        let bytes = alt.encoding.encode(&[RegPair::Bc.code() as i32, 0xDEAD]);
        assert_eq!(bytes, vec![0x01, 0xAD, 0xDE]);
    }

    #[test]
    fn sub_n_is_0xd6_not_0xd9() {
        let alts = alts_for(Mnemonic::Sub);
        let alt = alts.iter().find(|a| a.shape == [OperandKind::Int8]).unwrap();
        assert_eq!(alt.encoding.encode(&[0x05]), vec![0xD6, 0x05]);
    }

    #[test]
    fn rr_r_does_not_collide_with_rrc_r() {
        let rr = alts_for(Mnemonic::Rr).iter().find(|a| a.shape == [OperandKind::Reg]).unwrap();
        let rrc = alts_for(Mnemonic::Rrc).iter().find(|a| a.shape == [OperandKind::Reg]).unwrap();
        assert_eq!(rr.encoding.encode(&[Register::B.code() as i32]), vec![0xCB, 0x18]);
        assert_eq!(rrc.encoding.encode(&[Register::B.code() as i32]), vec![0xCB, 0x08]);
    }

    #[test]
    fn jr_encodes_placeholder_displacement_slot() {
        let alt = &alts_for(Mnemonic::Jr)[0];
        assert_eq!(alt.encoding.len(), 2);
    }
}
