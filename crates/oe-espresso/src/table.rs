//! The instruction table.
//!
//! One entry per mnemonic: encoding (ordered field == value pairs used to
//! build the decode trie), the fields it reads and writes, and its
//! modifier flags. Transcribed from the 750CL/Espresso books.

use crate::decoder::{InstructionOpcode, TableBuilder};
use crate::fields::InstructionField;

/// Identifies one instruction mnemonic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstructionId {
    // Integer arithmetic
    Add,
    Addc,
    Adde,
    Addi,
    Addic,
    Addicx,
    Addis,
    Addme,
    Addze,
    Divw,
    Divwu,
    Mulhw,
    Mulhwu,
    Mulli,
    Mullw,
    Neg,
    Subf,
    Subfc,
    Subfe,
    Subfic,
    Subfme,
    Subfze,

    // Integer compare
    Cmp,
    Cmpi,
    Cmpl,
    Cmpli,

    // Integer logical
    And,
    Andc,
    Andi,
    Andis,
    Cntlzw,
    Eqv,
    Extsb,
    Extsh,
    Nand,
    Nor,
    Or,
    Orc,
    Ori,
    Oris,
    Xor,
    Xori,
    Xoris,

    // Integer rotate
    Rlwimi,
    Rlwinm,
    Rlwnm,

    // Integer shift
    Slw,
    Sraw,
    Srawi,
    Srw,

    // Floating-point arithmetic
    Fadd,
    Fadds,
    Fdiv,
    Fdivs,
    Fmul,
    Fmuls,
    Fres,
    Frsqrte,
    Fsub,
    Fsubs,
    Fsel,

    // Floating-point multiply-add
    Fmadd,
    Fmadds,
    Fmsub,
    Fmsubs,
    Fnmadd,
    Fnmadds,
    Fnmsub,
    Fnmsubs,

    // Floating-point rounding and conversion
    Fctiw,
    Fctiwz,
    Frsp,

    // Floating-point compare
    Fcmpo,
    Fcmpu,

    // Floating-point status and control register
    Mcrfs,
    Mffs,
    Mtfsb0,
    Mtfsb1,
    Mtfsf,
    Mtfsfi,

    // Integer load
    Lbz,
    Lbzu,
    Lbzx,
    Lbzux,
    Lha,
    Lhau,
    Lhax,
    Lhaux,
    Lhz,
    Lhzu,
    Lhzx,
    Lhzux,
    Lwz,
    Lwzu,
    Lwzx,
    Lwzux,

    // Integer store
    Stb,
    Stbu,
    Stbx,
    Stbux,
    Sth,
    Sthu,
    Sthx,
    Sthux,
    Stw,
    Stwu,
    Stwx,
    Stwux,

    // Integer load and store with byte reverse
    Lhbrx,
    Lwbrx,
    Sthbrx,
    Stwbrx,

    // Integer load and store multiple
    Lmw,
    Stmw,

    // Integer load and store string
    Lswi,
    Lswx,
    Stswi,
    Stswx,

    // Memory synchronisation
    Eieio,
    Isync,
    Lwarx,
    Stwcx,
    Sync,

    // Floating-point load
    Lfd,
    Lfdu,
    Lfdx,
    Lfdux,
    Lfs,
    Lfsu,
    Lfsx,
    Lfsux,

    // Floating-point store
    Stfd,
    Stfdu,
    Stfdx,
    Stfdux,
    Stfiwx,
    Stfs,
    Stfsu,
    Stfsx,
    Stfsux,

    // Floating-point move
    Fabs,
    Fmr,
    Fnabs,
    Fneg,

    // Branch
    B,
    Bc,
    Bcctr,
    Bclr,

    // Condition register logical
    Crand,
    Crandc,
    Creqv,
    Crnand,
    Crnor,
    Cror,
    Crorc,
    Crxor,
    Mcrf,

    // System linkage
    Rfi,
    Kc,
    Sc,

    // Trap
    Tw,
    Twi,

    // Processor control
    Mcrxr,
    Mfcr,
    Mfmsr,
    Mfspr,
    Mftb,
    Mtcrf,
    Mtmsr,
    Mtspr,

    // Cache management
    Dcbf,
    Dcbi,
    Dcbst,
    Dcbt,
    Dcbtst,
    Dcbz,
    Icbi,
    DcbzL,

    // Segment register manipulation
    Mfsr,
    Mfsrin,
    Mtsr,
    Mtsrin,

    // Lookaside buffer management
    Tlbie,
    Tlbsync,

    // External control
    Eciwx,
    Ecowx,

    // Paired-single load and store
    PsqL,
    PsqLu,
    PsqLx,
    PsqLux,
    PsqSt,
    PsqStu,
    PsqStx,
    PsqStux,

    // Paired-single floating point arithmetic
    PsAdd,
    PsDiv,
    PsMul,
    PsSub,
    PsAbs,
    PsNabs,
    PsNeg,
    PsSel,
    PsRes,
    PsRsqrte,
    PsMsub,
    PsMadd,
    PsNmsub,
    PsNmadd,
    PsMr,
    PsSum0,
    PsSum1,
    PsMuls0,
    PsMuls1,
    PsMadds0,
    PsMadds1,
    PsCmpu0,
    PsCmpo0,
    PsCmpu1,
    PsCmpo1,
    PsMerge00,
    PsMerge01,
    PsMerge10,
    PsMerge11,
}

impl InstructionId {
    /// Number of defined instructions
    pub const COUNT: usize = Self::PsMerge11 as usize + 1;
}

macro_rules! ins {
    ($set:ident: $id:ident, $name:literal, $full:literal,
     w[$($w:ident),* $(,)?], r[$($r:ident),* $(,)?], f[$($f:ident),* $(,)?],
     op[$($field:ident == $val:literal),+ $(,)?]) => {
        $set.define(
            InstructionId::$id,
            $name,
            $full,
            vec![$(InstructionOpcode {
                field: InstructionField::$field,
                value: $val,
            }),+],
            vec![$(InstructionField::$r),*],
            vec![$(InstructionField::$w),*],
            vec![$(InstructionField::$f),*],
        );
    };
}

/// Populate the instruction table
pub(crate) fn define_instructions(set: &mut TableBuilder) {
    // Integer arithmetic
    ins!(set: Add, "add", "Add", w[Rd], r[Ra, Rb], f[Oe, Rc], op[Opcd == 31, Xo2 == 266]);
    ins!(set: Addc, "addc", "Add with Carry", w[Rd, XerCarry], r[Ra, Rb], f[Oe, Rc], op[Opcd == 31, Xo2 == 10]);
    ins!(set: Adde, "adde", "Add Extended", w[Rd], r[Ra, Rb, XerCarry], f[Oe, Rc], op[Opcd == 31, Xo2 == 138]);
    ins!(set: Addi, "addi", "Add Immediate", w[Rd], r[Ra, Simm], f[], op[Opcd == 14]);
    ins!(set: Addic, "addic", "Add Immediate with Carry", w[Rd, XerCarry], r[Ra, Simm], f[], op[Opcd == 12]);
    ins!(set: Addicx, "addic.", "Add Immediate with Carry and Record", w[Rd, XerCarry], r[Ra, Simm], f[AlwaysOe, AlwaysRc], op[Opcd == 13]);
    ins!(set: Addis, "addis", "Add Immediate Shifted", w[Rd], r[Ra, Simm], f[], op[Opcd == 15]);
    ins!(set: Addme, "addme", "Add to Minus One Extended", w[Rd], r[Ra, XerCarry], f[Oe, Rc], op[Opcd == 31, Xo2 == 234, Rsv16_20 == 0]);
    ins!(set: Addze, "addze", "Add to Zero Extended", w[Rd], r[Ra, XerCarry], f[Oe, Rc], op[Opcd == 31, Xo2 == 202, Rsv16_20 == 0]);
    ins!(set: Divw, "divw", "Divide Word", w[Rd], r[Ra, Rb], f[Oe, Rc], op[Opcd == 31, Xo2 == 491]);
    ins!(set: Divwu, "divwu", "Divide Word Unsigned", w[Rd], r[Ra, Rb], f[Oe, Rc], op[Opcd == 31, Xo2 == 459]);
    ins!(set: Mulhw, "mulhw", "Multiply High Word", w[Rd], r[Ra, Rb], f[Rc], op[Opcd == 31, Xo2 == 75]);
    ins!(set: Mulhwu, "mulhwu", "Multiply High Word Unsigned", w[Rd], r[Ra, Rb], f[Rc], op[Opcd == 31, Xo2 == 11]);
    ins!(set: Mulli, "mulli", "Multiply Low Immediate", w[Rd], r[Ra, Simm], f[], op[Opcd == 7]);
    ins!(set: Mullw, "mullw", "Multiply Low Word", w[Rd], r[Ra, Rb], f[Oe, Rc], op[Opcd == 31, Xo2 == 235]);
    ins!(set: Neg, "neg", "Negate", w[Rd], r[Ra], f[Oe, Rc], op[Opcd == 31, Xo2 == 104, Rsv16_20 == 0]);
    ins!(set: Subf, "subf", "Subtract From", w[Rd], r[Ra, Rb], f[Oe, Rc], op[Opcd == 31, Xo2 == 40]);
    ins!(set: Subfc, "subfc", "Subtract From with Carry", w[Rd], r[Ra, Rb], f[Oe, Rc], op[Opcd == 31, Xo2 == 8]);
    ins!(set: Subfe, "subfe", "Subtract From Extended", w[Rd], r[Ra, Rb, XerCarry], f[Oe, Rc], op[Opcd == 31, Xo2 == 136]);
    ins!(set: Subfic, "subfic", "Subtract From Immediate with Carry", w[Rd, XerCarry], r[Ra, Simm], f[], op[Opcd == 8]);
    ins!(set: Subfme, "subfme", "Subtract From Minus One Extended", w[Rd], r[Ra, XerCarry], f[Oe, Rc], op[Opcd == 31, Xo2 == 232, Rsv16_20 == 0]);
    ins!(set: Subfze, "subfze", "Subtract From Zero Extended", w[Rd], r[Ra, XerCarry], f[Oe, Rc], op[Opcd == 31, Xo2 == 200, Rsv16_20 == 0]);

    // Integer compare
    ins!(set: Cmp, "cmp", "Compare", w[CrfD], r[Ra, Rb, XerSo], f[L], op[Opcd == 31, Xo1 == 0, Rsv9 == 0, Rsv31 == 0]);
    ins!(set: Cmpi, "cmpi", "Compare Immediate", w[CrfD], r[Ra, Simm, XerSo], f[L], op[Opcd == 11, Rsv9 == 0]);
    ins!(set: Cmpl, "cmpl", "Compare Logical", w[CrfD], r[Ra, Rb, XerSo], f[L], op[Opcd == 31, Xo1 == 32, Rsv9 == 0, Rsv31 == 0]);
    ins!(set: Cmpli, "cmpli", "Compare Logical Immediate", w[CrfD], r[Ra, Uimm, XerSo], f[L], op[Opcd == 10, Rsv9 == 0]);

    // Integer logical
    ins!(set: And, "and", "AND", w[Ra], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 28]);
    ins!(set: Andc, "andc", "AND with Complement", w[Ra], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 60]);
    ins!(set: Andi, "andi.", "AND Immediate", w[Ra], r[Rs, Uimm], f[AlwaysOe, AlwaysRc], op[Opcd == 28]);
    ins!(set: Andis, "andis.", "AND Immediate Shifted", w[Ra], r[Rs, Uimm], f[AlwaysOe, AlwaysRc], op[Opcd == 29]);
    ins!(set: Cntlzw, "cntlzw", "Count Leading Zeroes Word", w[Ra], r[Rs], f[Rc], op[Opcd == 31, Xo1 == 26, Rsv16_20 == 0]);
    ins!(set: Eqv, "eqv", "Equivalent", w[Ra], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 284]);
    ins!(set: Extsb, "extsb", "Extend Sign Byte", w[Ra], r[Rs], f[Rc], op[Opcd == 31, Xo1 == 954, Rsv16_20 == 0]);
    ins!(set: Extsh, "extsh", "Extend Sign Half Word", w[Ra], r[Rs], f[Rc], op[Opcd == 31, Xo1 == 922, Rsv16_20 == 0]);
    ins!(set: Nand, "nand", "NAND", w[Ra], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 476]);
    ins!(set: Nor, "nor", "NOR", w[Ra], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 124]);
    ins!(set: Or, "or", "OR", w[Ra], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 444]);
    ins!(set: Orc, "orc", "OR with Complement", w[Ra], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 412]);
    ins!(set: Ori, "ori", "OR Immediate", w[Ra], r[Rs, Uimm], f[], op[Opcd == 24]);
    ins!(set: Oris, "oris", "OR Immediate Shifted", w[Ra], r[Rs, Uimm], f[], op[Opcd == 25]);
    ins!(set: Xor, "xor", "XOR", w[Ra], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 316]);
    ins!(set: Xori, "xori", "XOR Immediate", w[Ra], r[Rs, Uimm], f[], op[Opcd == 26]);
    ins!(set: Xoris, "xoris", "XOR Immediate Shifted", w[Ra], r[Rs, Uimm], f[], op[Opcd == 27]);

    // Integer rotate
    ins!(set: Rlwimi, "rlwimi", "Rotate Left Word Immediate then Mask Insert", w[Ra], r[Ra, Rs, Sh, Mb, Me], f[Rc], op[Opcd == 20]);
    ins!(set: Rlwinm, "rlwinm", "Rotate Left Word Immediate then AND with Mask", w[Ra], r[Rs, Sh, Mb, Me], f[Rc], op[Opcd == 21]);
    ins!(set: Rlwnm, "rlwnm", "Rotate Left Word then AND with Mask", w[Ra], r[Rs, Rb, Mb, Me], f[Rc], op[Opcd == 23]);

    // Integer shift
    ins!(set: Slw, "slw", "Shift Left Word", w[Ra], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 24]);
    ins!(set: Sraw, "sraw", "Shift Right Arithmetic Word", w[Ra, XerCarry], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 792]);
    ins!(set: Srawi, "srawi", "Shift Right Arithmetic Word Immediate", w[Ra, XerCarry], r[Rs, Sh], f[Rc], op[Opcd == 31, Xo1 == 824]);
    ins!(set: Srw, "srw", "Shift Right Word", w[Ra], r[Rs, Rb], f[Rc], op[Opcd == 31, Xo1 == 536]);

    // Floating-point arithmetic
    ins!(set: Fadd, "fadd", "Floating Add", w[FrD, FcrIsi, FcrSnan], r[FrA, FrB], f[Rc], op[Opcd == 63, Xo4 == 21]);
    ins!(set: Fadds, "fadds", "Floating Add Single", w[FrD, FcrIsi, FcrSnan], r[FrA, FrB], f[Rc], op[Opcd == 59, Xo4 == 21]);
    ins!(set: Fdiv, "fdiv", "Floating Divide", w[FrD, FcrZdz, FcrIdi, FcrSnan], r[FrA, FrB], f[Rc], op[Opcd == 63, Xo4 == 18]);
    ins!(set: Fdivs, "fdivs", "Floating Divide Single", w[FrD], r[FrA, FrB], f[Rc], op[Opcd == 59, Xo4 == 18]);
    ins!(set: Fmul, "fmul", "Floating Multiply", w[FrD], r[FrA, FrC], f[Rc], op[Opcd == 63, Xo4 == 25]);
    ins!(set: Fmuls, "fmuls", "Floating Multiply Single", w[FrD], r[FrA, FrC], f[Rc], op[Opcd == 59, Xo4 == 25]);
    ins!(set: Fres, "fres", "Floating Reciprocal Estimate Single", w[FrD], r[FrB], f[Rc], op[Opcd == 59, Xo4 == 24]);
    ins!(set: Frsqrte, "frsqrte", "Floating Reciprocal Square Root Estimate", w[FrD], r[FrB], f[Rc], op[Opcd == 63, Xo4 == 26]);
    ins!(set: Fsub, "fsub", "Floating Sub", w[FrD], r[FrA, FrB], f[Rc], op[Opcd == 63, Xo4 == 20]);
    ins!(set: Fsubs, "fsubs", "Floating Sub Single", w[FrD], r[FrA, FrB], f[Rc], op[Opcd == 59, Xo4 == 20]);
    ins!(set: Fsel, "fsel", "Floating Select", w[FrD], r[FrA, FrB, FrC], f[Rc], op[Opcd == 63, Xo4 == 23]);

    // Floating-point multiply-add
    ins!(set: Fmadd, "fmadd", "Floating Multiply-Add", w[FrD], r[FrA, FrC, FrB], f[Rc], op[Opcd == 63, Xo4 == 29]);
    ins!(set: Fmadds, "fmadds", "Floating Multiply-Add Single", w[FrD], r[FrA, FrC, FrB], f[Rc], op[Opcd == 59, Xo4 == 29]);
    ins!(set: Fmsub, "fmsub", "Floating Multiply-Sub", w[FrD], r[FrA, FrC, FrB], f[Rc], op[Opcd == 63, Xo4 == 28]);
    ins!(set: Fmsubs, "fmsubs", "Floating Multiply-Sub Single", w[FrD], r[FrA, FrC, FrB], f[Rc], op[Opcd == 59, Xo4 == 28]);
    ins!(set: Fnmadd, "fnmadd", "Floating Negative Multiply-Add", w[FrD], r[FrA, FrC, FrB], f[Rc], op[Opcd == 63, Xo4 == 31]);
    ins!(set: Fnmadds, "fnmadds", "Floating Negative Multiply-Add Single", w[FrD], r[FrA, FrC, FrB], f[Rc], op[Opcd == 59, Xo4 == 31]);
    ins!(set: Fnmsub, "fnmsub", "Floating Negative Multiply-Sub", w[FrD], r[FrA, FrC, FrB], f[Rc], op[Opcd == 63, Xo4 == 30]);
    ins!(set: Fnmsubs, "fnmsubs", "Floating Negative Multiply-Sub Single", w[FrD], r[FrA, FrC, FrB], f[Rc], op[Opcd == 59, Xo4 == 30]);

    // Floating-point rounding and conversion
    ins!(set: Fctiw, "fctiw", "Floating Convert to Integer Word", w[FrD], r[FrB], f[Rc], op[Opcd == 63, Xo1 == 14]);
    ins!(set: Fctiwz, "fctiwz", "Floating Convert to Integer Word with Round toward Zero", w[FrD], r[FrB], f[Rc], op[Opcd == 63, Xo1 == 15]);
    ins!(set: Frsp, "frsp", "Floating Round to Single", w[FrD], r[FrB], f[Rc], op[Opcd == 63, Xo1 == 12]);

    // Floating-point compare
    ins!(set: Fcmpo, "fcmpo", "Floating Compare Ordered", w[CrfD], r[FrA, FrB], f[], op[Opcd == 63, Xo1 == 32, Rsv9_10 == 0, Rsv31 == 0]);
    ins!(set: Fcmpu, "fcmpu", "Floating Compare Unordered", w[CrfD], r[FrA, FrB], f[], op[Opcd == 63, Xo1 == 0, Rsv9_10 == 0, Rsv31 == 0]);

    // Floating-point status and control register
    ins!(set: Mcrfs, "mcrfs", "", w[CrfD], r[CrfS], f[], op[Opcd == 63, Xo1 == 64, Rsv9_10 == 0, Rsv14_15 == 0, Rsv16_20 == 0, Rsv31 == 0]);
    ins!(set: Mffs, "mffs", "", w[FrD], r[], f[Rc], op[Opcd == 63, Xo1 == 583, Rsv11_15 == 0, Rsv16_20 == 0]);
    ins!(set: Mtfsb0, "mtfsb0", "", w[], r[CrbD], f[Rc], op[Opcd == 63, Xo1 == 70, Rsv11_15 == 0, Rsv16_20 == 0]);
    ins!(set: Mtfsb1, "mtfsb1", "", w[], r[CrbD], f[Rc], op[Opcd == 63, Xo1 == 38, Rsv11_15 == 0, Rsv16_20 == 0]);
    ins!(set: Mtfsf, "mtfsf", "", w[], r[Fm, FrB], f[Rc], op[Opcd == 63, Xo1 == 711, Rsv6 == 0, Rsv15 == 0]);
    ins!(set: Mtfsfi, "mtfsfi", "", w[CrfD], r[], f[Rc, Imm], op[Opcd == 63, Xo1 == 134, Rsv9_10 == 0, Rsv11_15 == 0, Rsv20 == 0]);

    // Integer load
    ins!(set: Lbz, "lbz", "Load Byte and Zero", w[Rd], r[Ra, D], f[], op[Opcd == 34]);
    ins!(set: Lbzu, "lbzu", "Load Byte and Zero with Update", w[Rd, Ra], r[Ra, D], f[], op[Opcd == 35]);
    ins!(set: Lbzx, "lbzx", "Load Byte and Zero Indexed", w[Rd], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 87, Rsv31 == 0]);
    ins!(set: Lbzux, "lbzux", "Load Byte and Zero with Update Indexed", w[Rd, Ra], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 119, Rsv31 == 0]);
    ins!(set: Lha, "lha", "Load Half Word Algebraic", w[Rd], r[Ra, D], f[], op[Opcd == 42]);
    ins!(set: Lhau, "lhau", "Load Half Word Algebraic with Update", w[Rd, Ra], r[Ra, D], f[], op[Opcd == 43]);
    ins!(set: Lhax, "lhax", "Load Half Word Algebraic Indexed", w[Rd], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 343, Rsv31 == 0]);
    ins!(set: Lhaux, "lhaux", "Load Half Word Algebraic with Update Indexed", w[Rd, Ra], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 375, Rsv31 == 0]);
    ins!(set: Lhz, "lhz", "Load Half Word and Zero", w[Rd], r[Ra, D], f[], op[Opcd == 40]);
    ins!(set: Lhzu, "lhzu", "Load Half Word and Zero with Update", w[Rd, Ra], r[Ra, D], f[], op[Opcd == 41]);
    ins!(set: Lhzx, "lhzx", "Load Half Word and Zero Indexed", w[Rd], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 279, Rsv31 == 0]);
    ins!(set: Lhzux, "lhzux", "Load Half Word and Zero with Update Indexed", w[Rd, Ra], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 311, Rsv31 == 0]);
    ins!(set: Lwz, "lwz", "Load Word and Zero", w[Rd], r[Ra, D], f[], op[Opcd == 32]);
    ins!(set: Lwzu, "lwzu", "Load Word and Zero with Update", w[Rd, Ra], r[Ra, D], f[], op[Opcd == 33]);
    ins!(set: Lwzx, "lwzx", "Load Word and Zero Indexed", w[Rd], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 23, Rsv31 == 0]);
    ins!(set: Lwzux, "lwzux", "Load Word and Zero with Update Indexed", w[Rd, Ra], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 55, Rsv31 == 0]);

    // Integer store
    ins!(set: Stb, "stb", "Store Byte", w[], r[Rs, Ra, D], f[], op[Opcd == 38]);
    ins!(set: Stbu, "stbu", "Store Byte with Update", w[Ra], r[Rs, Ra, D], f[], op[Opcd == 39]);
    ins!(set: Stbx, "stbx", "Store Byte Indexed", w[], r[Rs, Ra, Rb], f[], op[Opcd == 31, Xo1 == 215, Rsv31 == 0]);
    ins!(set: Stbux, "stbux", "Store Byte with Update Indexed", w[Ra], r[Rs, Ra, Rb], f[], op[Opcd == 31, Xo1 == 247, Rsv31 == 0]);
    ins!(set: Sth, "sth", "Store Half Word", w[], r[Rs, Ra, D], f[], op[Opcd == 44]);
    ins!(set: Sthu, "sthu", "Store Half Word with Update", w[Ra], r[Rs, Ra, D], f[], op[Opcd == 45]);
    ins!(set: Sthx, "sthx", "Store Half Word Indexed", w[], r[Rs, Ra, Rb], f[], op[Opcd == 31, Xo1 == 407, Rsv31 == 0]);
    ins!(set: Sthux, "sthux", "Store Half Word with Update Indexed", w[Ra], r[Rs, Ra, Rb], f[], op[Opcd == 31, Xo1 == 439, Rsv31 == 0]);
    ins!(set: Stw, "stw", "Store Word", w[], r[Rs, Ra, D], f[], op[Opcd == 36]);
    ins!(set: Stwu, "stwu", "Store Word with Update", w[Ra], r[Rs, Ra, D], f[], op[Opcd == 37]);
    ins!(set: Stwx, "stwx", "Store Word Indexed", w[], r[Rs, Ra, Rb], f[], op[Opcd == 31, Xo1 == 151, Rsv31 == 0]);
    ins!(set: Stwux, "stwux", "Store Word with Update Indexed", w[Ra], r[Rs, Ra, Rb], f[], op[Opcd == 31, Xo1 == 183, Rsv31 == 0]);

    // Integer load and store with byte reverse
    ins!(set: Lhbrx, "lhbrx", "Load Half Word Byte-Reverse Indexed", w[Rd], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 790, Rsv31 == 0]);
    ins!(set: Lwbrx, "lwbrx", "Load Word Byte-Reverse Indexed", w[Rd], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 534, Rsv31 == 0]);
    ins!(set: Sthbrx, "sthbrx", "Store Half Word Byte-Reverse Indexed", w[], r[Rs, Ra, Rb], f[], op[Opcd == 31, Xo1 == 918, Rsv31 == 0]);
    ins!(set: Stwbrx, "stwbrx", "Store Word Byte-Reverse Indexed", w[], r[Rs, Ra, Rb], f[], op[Opcd == 31, Xo1 == 662, Rsv31 == 0]);

    // Integer load and store multiple
    ins!(set: Lmw, "lmw", "Load Multiple Words", w[Rd], r[Ra, D], f[], op[Opcd == 46]);
    ins!(set: Stmw, "stmw", "Store Multiple Words", w[], r[Rs, Ra, D], f[], op[Opcd == 47]);

    // Integer load and store string
    ins!(set: Lswi, "lswi", "Load String Word Immediate", w[Rd], r[Ra, Nb], f[], op[Opcd == 31, Xo1 == 597, Rsv31 == 0]);
    ins!(set: Lswx, "lswx", "Load String Word Indexed", w[Rd], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 533, Rsv31 == 0]);
    ins!(set: Stswi, "stswi", "Store String Word Immediate", w[], r[Rs, Ra, Nb], f[], op[Opcd == 31, Xo1 == 725, Rsv31 == 0]);
    ins!(set: Stswx, "stswx", "Store String Word Indexed", w[], r[Rs, Ra, Rb], f[], op[Opcd == 31, Xo1 == 661, Rsv31 == 0]);

    // Memory synchronisation
    ins!(set: Eieio, "eieio", "Enforce In-Order Execution of I/O", w[], r[], f[], op[Opcd == 31, Xo1 == 854, Rsv6_10 == 0, Rsv11_15 == 0, Rsv16_20 == 0, Rsv31 == 0]);
    ins!(set: Isync, "isync", "Instruction Synchronise", w[], r[], f[], op[Opcd == 19, Xo1 == 150, Rsv6_10 == 0, Rsv11_15 == 0, Rsv16_20 == 0, Rsv31 == 0]);
    ins!(set: Lwarx, "lwarx", "Load Word and Reserve Indexed", w[Rd, Reserve], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 20, Rsv31 == 0]);
    ins!(set: Stwcx, "stwcx.", "Store Word Conditional Indexed", w[Reserve], r[Rs, Ra, Rb], f[], op[Opcd == 31, Xo1 == 150, Rsv31 == 1]);
    ins!(set: Sync, "sync", "Synchronise", w[], r[], f[L], op[Opcd == 31, Xo1 == 598, Rsv6_9 == 0, Rsv11_15 == 0, Rsv16_20 == 0, Rsv31 == 0]);

    // Floating-point load
    ins!(set: Lfd, "lfd", "Load Floating-Point Double", w[FrD], r[Ra, D], f[], op[Opcd == 50]);
    ins!(set: Lfdu, "lfdu", "Load Floating-Point Double with Update", w[FrD, Ra], r[Ra, D], f[], op[Opcd == 51]);
    ins!(set: Lfdx, "lfdx", "Load Floating-Point Double Indexed", w[FrD], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 599, Rsv31 == 0]);
    ins!(set: Lfdux, "lfdux", "Load Floating-Point Double with Update Indexed", w[FrD, Ra], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 631, Rsv31 == 0]);
    ins!(set: Lfs, "lfs", "Load Floating-Point Single", w[FrD], r[Ra, D], f[], op[Opcd == 48]);
    ins!(set: Lfsu, "lfsu", "Load Floating-Point Single with Update", w[FrD, Ra], r[Ra, D], f[], op[Opcd == 49]);
    ins!(set: Lfsx, "lfsx", "Load Floating-Point Single Indexed", w[FrD], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 535, Rsv31 == 0]);
    ins!(set: Lfsux, "lfsux", "Load Floating-Point Single with Update Indexed", w[FrD, Ra], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 567, Rsv31 == 0]);

    // Floating-point store
    ins!(set: Stfd, "stfd", "Store Floating-Point Double", w[], r[FrS, Ra, D], f[], op[Opcd == 54]);
    ins!(set: Stfdu, "stfdu", "Store Floating-Point Double with Update", w[Ra], r[FrS, Ra, D], f[], op[Opcd == 55]);
    ins!(set: Stfdx, "stfdx", "Store Floating-Point Double Indexed", w[], r[FrS, Ra, Rb], f[], op[Opcd == 31, Xo1 == 727, Rsv31 == 0]);
    ins!(set: Stfdux, "stfdux", "Store Floating-Point Double with Update Indexed", w[Ra], r[FrS, Ra, Rb], f[], op[Opcd == 31, Xo1 == 759, Rsv31 == 0]);
    ins!(set: Stfiwx, "stfiwx", "Store Floating-Point as Integer Word Indexed", w[], r[FrS, Ra, Rb], f[], op[Opcd == 31, Xo1 == 983, Rsv31 == 0]);
    ins!(set: Stfs, "stfs", "Store Floating-Point Single", w[], r[FrS, Ra, D], f[], op[Opcd == 52]);
    ins!(set: Stfsu, "stfsu", "Store Floating-Point Single with Update", w[Ra], r[FrS, Ra, D], f[], op[Opcd == 53]);
    ins!(set: Stfsx, "stfsx", "Store Floating-Point Single Indexed", w[], r[FrS, Ra, Rb], f[], op[Opcd == 31, Xo1 == 663, Rsv31 == 0]);
    ins!(set: Stfsux, "stfsux", "Store Floating-Point Single with Update Indexed", w[Ra], r[FrS, Ra, Rb], f[], op[Opcd == 31, Xo1 == 695, Rsv31 == 0]);

    // Floating-point move
    ins!(set: Fabs, "fabs", "Floating Absolute Value", w[FrD], r[FrB], f[Rc], op[Opcd == 63, Xo1 == 264, Rsv11_15 == 0]);
    ins!(set: Fmr, "fmr", "Floating Move Register", w[FrD], r[FrB], f[Rc], op[Opcd == 63, Xo1 == 72, Rsv11_15 == 0]);
    ins!(set: Fnabs, "fnabs", "Floating Negative Absolute Value", w[FrD], r[FrB], f[Rc], op[Opcd == 63, Xo1 == 136, Rsv11_15 == 0]);
    ins!(set: Fneg, "fneg", "Floating Negate", w[FrD], r[FrB], f[Rc], op[Opcd == 63, Xo1 == 40, Rsv11_15 == 0]);

    // Branch
    ins!(set: B, "b", "Branch", w[], r[Li], f[Aa, Lk], op[Opcd == 18]);
    ins!(set: Bc, "bc", "Branch Conditional", w[Bo], r[Bi, Bd], f[Aa, Lk], op[Opcd == 16]);
    ins!(set: Bcctr, "bcctr", "Branch Conditional to CTR", w[Bo], r[Bi, Ctr], f[Lk], op[Opcd == 19, Xo1 == 528, Rsv16_20 == 0]);
    ins!(set: Bclr, "bclr", "Branch Conditional to LR", w[Bo], r[Bi, Lr], f[Lk], op[Opcd == 19, Xo1 == 16, Rsv16_20 == 0]);

    // Condition register logical
    ins!(set: Crand, "crand", "Condition Register AND", w[CrbD], r[CrbA, CrbB], f[], op[Opcd == 19, Xo1 == 257, Rsv31 == 0]);
    ins!(set: Crandc, "crandc", "Condition Register AND with Complement", w[CrbD], r[CrbA, CrbB], f[], op[Opcd == 19, Xo1 == 129, Rsv31 == 0]);
    ins!(set: Creqv, "creqv", "Condition Register Equivalent", w[CrbD], r[CrbA, CrbB], f[], op[Opcd == 19, Xo1 == 289, Rsv31 == 0]);
    ins!(set: Crnand, "crnand", "Condition Register NAND", w[CrbD], r[CrbA, CrbB], f[], op[Opcd == 19, Xo1 == 225, Rsv31 == 0]);
    ins!(set: Crnor, "crnor", "Condition Register NOR", w[CrbD], r[CrbA, CrbB], f[], op[Opcd == 19, Xo1 == 33, Rsv31 == 0]);
    ins!(set: Cror, "cror", "Condition Register OR", w[CrbD], r[CrbA, CrbB], f[], op[Opcd == 19, Xo1 == 449, Rsv31 == 0]);
    ins!(set: Crorc, "crorc", "Condition Register OR with Complement", w[CrbD], r[CrbA, CrbB], f[], op[Opcd == 19, Xo1 == 417, Rsv31 == 0]);
    ins!(set: Crxor, "crxor", "Condition Register XOR", w[CrbD], r[CrbA, CrbB], f[], op[Opcd == 19, Xo1 == 193, Rsv31 == 0]);
    ins!(set: Mcrf, "mcrf", "Move Condition Register Field", w[CrfD], r[CrfS], f[], op[Opcd == 19, Xo1 == 0, Rsv9_10 == 0, Rsv14_15 == 0, Rsv16_20 == 0, Rsv31 == 0]);

    // System linkage
    ins!(set: Rfi, "rfi", "", w[], r[], f[], op[Opcd == 19, Xo1 == 50, Rsv6_10 == 0, Rsv11_15 == 0, Rsv16_20 == 0, Rsv31 == 0]);
    // Must come before sc for proper table setup
    ins!(set: Kc, "kc", "krncall", w[], r[Kcn], f[], op[Opcd == 17, Rsv31 == 1]);
    ins!(set: Sc, "sc", "Syscall", w[], r[], f[], op[Opcd == 17, Rsv6_10 == 0, Rsv11_15 == 0, Rsv16_29 == 0, Rsv30 == 1, Rsv31 == 0]);

    // Trap
    ins!(set: Tw, "tw", "", w[], r[To, Ra, Rb], f[], op[Opcd == 31, Xo1 == 4, Rsv31 == 0]);
    ins!(set: Twi, "twi", "", w[], r[To, Ra, Simm], f[], op[Opcd == 3]);

    // Processor control
    ins!(set: Mcrxr, "mcrxr", "Move to Condition Register from XERO", w[CrfD], r[XerOverflow], f[], op[Opcd == 31, Xo1 == 512, Rsv9_10 == 0, Rsv11_15 == 0, Rsv16_20 == 0, Rsv31 == 0]);
    // mfcr requires bit 11 to be 0 (if 1, it's the mfocrf instruction), but
    // the Espresso ignores bit 11 and treats mfocrf as mfcr.
    ins!(set: Mfcr, "mfcr", "Move from Condition Register", w[Rd], r[], f[], op[Opcd == 31, Xo1 == 19, Rsv20 == 0, Rsv31 == 0]);
    ins!(set: Mfmsr, "mfmsr", "Move from Machine State Register", w[Rd], r[], f[], op[Opcd == 31, Xo1 == 83, Rsv11_15 == 0, Rsv16_20 == 0, Rsv31 == 0]);
    ins!(set: Mfspr, "mfspr", "Move from Special Purpose Register", w[Rd], r[Spr], f[], op[Opcd == 31, Xo1 == 339, Rsv31 == 0]);
    ins!(set: Mftb, "mftb", "Move from Time Base Register", w[Rd], r[Tbr], f[], op[Opcd == 31, Xo1 == 371, Rsv31 == 0]);
    // mtcrf requires bit 11 to be 0 (if 1, it's the mtocrf instruction), but
    // the Espresso ignores bit 11 and treats mtocrf as mtcrf.
    ins!(set: Mtcrf, "mtcrf", "Move to Condition Register Fields", w[Crm], r[Rs], f[], op[Opcd == 31, Xo1 == 144, Rsv20 == 0, Rsv31 == 0]);
    ins!(set: Mtmsr, "mtmsr", "Move to Machine State Register", w[], r[Rs], f[], op[Opcd == 31, Xo1 == 146, Rsv11_15 == 0, Rsv16_20 == 0, Rsv31 == 0]);
    ins!(set: Mtspr, "mtspr", "Move to Special Purpose Register", w[Spr], r[Rs], f[], op[Opcd == 31, Xo1 == 467, Rsv31 == 0]);

    // Cache management
    ins!(set: Dcbf, "dcbf", "", w[], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 86, Rsv6_10 == 0, Rsv31 == 0]);
    ins!(set: Dcbi, "dcbi", "", w[], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 470, Rsv6_10 == 0, Rsv31 == 0]);
    ins!(set: Dcbst, "dcbst", "", w[], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 54, Rsv6_10 == 0, Rsv31 == 0]);
    ins!(set: Dcbt, "dcbt", "", w[], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 278, Rsv6_10 == 0, Rsv31 == 0]);
    ins!(set: Dcbtst, "dcbtst", "", w[], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 246, Rsv6_10 == 0, Rsv31 == 0]);
    ins!(set: Dcbz, "dcbz", "", w[], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 1014, Rsv6_10 == 0, Rsv31 == 0]);
    ins!(set: Icbi, "icbi", "", w[], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 982, Rsv6_10 == 0, Rsv31 == 0]);
    ins!(set: DcbzL, "dcbz_l", "", w[], r[Ra, Rb], f[], op[Opcd == 4, Xo1 == 1014, Rsv6_10 == 0, Rsv31 == 0]);

    // Segment register manipulation
    ins!(set: Mfsr, "mfsr", "Move from Segment Register", w[Rd], r[Sr], f[], op[Opcd == 31, Xo1 == 595, Rsv11 == 0, Rsv16_20 == 0, Rsv31 == 0]);
    ins!(set: Mfsrin, "mfsrin", "Move from Segment Register Indirect", w[Rd], r[Rb], f[], op[Opcd == 31, Xo1 == 659, Rsv11_15 == 0, Rsv31 == 0]);
    ins!(set: Mtsr, "mtsr", "Move to Segment Register", w[], r[Rd, Sr], f[], op[Opcd == 31, Xo1 == 210, Rsv11 == 0, Rsv16_20 == 0, Rsv31 == 0]);
    ins!(set: Mtsrin, "mtsrin", "Move to Segment Register Indirect", w[], r[Rd, Rb], f[], op[Opcd == 31, Xo1 == 242, Rsv11_15 == 0, Rsv31 == 0]);

    // Lookaside buffer management
    ins!(set: Tlbie, "tlbie", "", w[], r[Rb], f[], op[Opcd == 31, Xo1 == 306, Rsv6_10 == 0, Rsv11_15 == 0, Rsv31 == 0]);
    ins!(set: Tlbsync, "tlbsync", "", w[], r[], f[], op[Opcd == 31, Xo1 == 566, Rsv6_10 == 0, Rsv11_15 == 0, Rsv16_20 == 0, Rsv31 == 0]);

    // External control
    ins!(set: Eciwx, "eciwx", "", w[Rd], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 310, Rsv31 == 0]);
    ins!(set: Ecowx, "ecowx", "", w[Rd], r[Ra, Rb], f[], op[Opcd == 31, Xo1 == 438, Rsv31 == 0]);

    // Paired-single load and store
    ins!(set: PsqL, "psq_l", "Paired Single Load", w[FrD], r[Ra, Qd], f[W, I], op[Opcd == 56]);
    ins!(set: PsqLu, "psq_lu", "Paired Single Load with Update", w[FrD], r[Ra, Qd], f[W, I], op[Opcd == 57]);
    ins!(set: PsqLx, "psq_lx", "Paired Single Load Indexed", w[FrD], r[Ra, Rb], f[Qw, Qi], op[Opcd == 4, Xo3 == 6, Rsv31 == 0]);
    ins!(set: PsqLux, "psq_lux", "Paired Single Load with Update Indexed", w[FrD], r[Ra, Rb], f[Qw, Qi], op[Opcd == 4, Xo3 == 38, Rsv31 == 0]);
    ins!(set: PsqSt, "psq_st", "Paired Single Store", w[FrD], r[Ra, Qd], f[W, I], op[Opcd == 60]);
    ins!(set: PsqStu, "psq_stu", "Paired Single Store with Update", w[FrD], r[Ra, Qd], f[W, I], op[Opcd == 61]);
    ins!(set: PsqStx, "psq_stx", "Paired Single Store Indexed", w[FrS], r[Ra, Rb], f[Qw, Qi], op[Opcd == 4, Xo3 == 7, Rsv31 == 0]);
    ins!(set: PsqStux, "psq_stux", "Paired Single Store with Update Indexed", w[FrS], r[Ra, Rb], f[Qw, Qi], op[Opcd == 4, Xo3 == 39, Rsv31 == 0]);

    // Paired-single floating point arithmetic
    ins!(set: PsAdd, "ps_add", "Paired Single Add", w[FrD, Fpscr], r[FrA, FrB], f[Rc], op[Opcd == 4, Xo4 == 21]);
    ins!(set: PsDiv, "ps_div", "Paired Single Divide", w[FrD, Fpscr], r[FrA, FrB], f[Rc], op[Opcd == 4, Xo4 == 18]);
    ins!(set: PsMul, "ps_mul", "Paired Single Multiply", w[FrD, Fpscr], r[FrA, FrC], f[Rc], op[Opcd == 4, Xo4 == 25]);
    ins!(set: PsSub, "ps_sub", "Paired Single Subtract", w[FrD, Fpscr], r[FrA, FrB], f[Rc], op[Opcd == 4, Xo4 == 20]);
    ins!(set: PsAbs, "ps_abs", "Paired Single Absolute", w[FrD], r[FrB], f[Rc], op[Opcd == 4, Xo1 == 264, Rsv11_15 == 0]);
    ins!(set: PsNabs, "ps_nabs", "Paired Single Negate Absolute", w[FrD], r[FrB], f[Rc], op[Opcd == 4, Xo1 == 136, Rsv11_15 == 0]);
    ins!(set: PsNeg, "ps_neg", "Paired Single Negate", w[FrD], r[FrB], f[Rc], op[Opcd == 4, Xo1 == 40, Rsv11_15 == 0]);
    ins!(set: PsSel, "ps_sel", "Paired Single Select", w[FrD], r[FrA, FrC, FrB], f[Rc], op[Opcd == 4, Xo4 == 23]);
    ins!(set: PsRes, "ps_res", "Paired Single Reciprocal", w[FrD, Fpscr], r[FrB], f[Rc], op[Opcd == 4, Xo4 == 24]);
    ins!(set: PsRsqrte, "ps_rsqrte", "Paired Single Reciprocal Square Root Estimate", w[FrD, Fpscr], r[FrB], f[Rc], op[Opcd == 4, Xo4 == 26]);
    ins!(set: PsMsub, "ps_msub", "Paired Single Multiply and Subtract", w[FrD, Fpscr], r[FrA, FrC, FrB], f[Rc], op[Opcd == 4, Xo4 == 28]);
    ins!(set: PsMadd, "ps_madd", "Paired Single Multiply and Add", w[FrD, Fpscr], r[FrA, FrC, FrB], f[Rc], op[Opcd == 4, Xo4 == 29]);
    ins!(set: PsNmsub, "ps_nmsub", "Paired Single Negate Multiply and Subtract", w[FrD, Fpscr], r[FrA, FrC, FrB], f[Rc], op[Opcd == 4, Xo4 == 30]);
    ins!(set: PsNmadd, "ps_nmadd", "Paired Single Negate Multiply and Add", w[FrD, Fpscr], r[FrA, FrC, FrB], f[Rc], op[Opcd == 4, Xo4 == 31]);
    ins!(set: PsMr, "ps_mr", "Paired Single Move Register", w[FrD], r[FrB], f[Rc], op[Opcd == 4, Xo1 == 72, Rsv11_15 == 0]);
    ins!(set: PsSum0, "ps_sum0", "Paired Single Sum High", w[FrD, Fpscr], r[FrA, FrC, FrB], f[Rc], op[Opcd == 4, Xo4 == 10]);
    ins!(set: PsSum1, "ps_sum1", "Paired Single Sum Low", w[FrD, Fpscr], r[FrA, FrC, FrB], f[Rc], op[Opcd == 4, Xo4 == 11]);
    ins!(set: PsMuls0, "ps_muls0", "Paired Single Multiply Scalar High", w[FrD, Fpscr], r[FrA, FrC], f[Rc], op[Opcd == 4, Xo4 == 12]);
    ins!(set: PsMuls1, "ps_muls1", "Paired Single Multiply Scalar Low", w[FrD, Fpscr], r[FrA, FrC], f[Rc], op[Opcd == 4, Xo4 == 13]);
    ins!(set: PsMadds0, "ps_madds0", "Paired Single Multiply and Add Scalar High", w[FrD, Fpscr], r[FrA, FrC, FrB], f[Rc], op[Opcd == 4, Xo4 == 14]);
    ins!(set: PsMadds1, "ps_madds1", "Paired Single Multiply and Add Scalar Low", w[FrD, Fpscr], r[FrA, FrC, FrB], f[Rc], op[Opcd == 4, Xo4 == 15]);
    ins!(set: PsCmpu0, "ps_cmpu0", "Paired Single Compare Unordered High", w[CrfD, Fpscr], r[FrA, FrB], f[], op[Opcd == 4, Xo1 == 0, Rsv9_10 == 0, Rsv31 == 0]);
    ins!(set: PsCmpo0, "ps_cmpo0", "Paired Single Compare Ordered High", w[CrfD, Fpscr], r[FrA, FrB], f[], op[Opcd == 4, Xo1 == 32, Rsv9_10 == 0, Rsv31 == 0]);
    ins!(set: PsCmpu1, "ps_cmpu1", "Paired Single Compare Unordered Low", w[CrfD, Fpscr], r[FrA, FrB], f[], op[Opcd == 4, Xo1 == 64, Rsv9_10 == 0, Rsv31 == 0]);
    ins!(set: PsCmpo1, "ps_cmpo1", "Paired Single Compare Ordered Low", w[CrfD, Fpscr], r[FrA, FrB], f[], op[Opcd == 4, Xo1 == 96, Rsv9_10 == 0, Rsv31 == 0]);
    ins!(set: PsMerge00, "ps_merge00", "Paired Single Merge High", w[FrD], r[FrA, FrB], f[Rc], op[Opcd == 4, Xo1 == 528]);
    ins!(set: PsMerge01, "ps_merge01", "Paired Single Merge Direct", w[FrD], r[FrA, FrB], f[Rc], op[Opcd == 4, Xo1 == 560]);
    ins!(set: PsMerge10, "ps_merge10", "Paired Single Merge Swapped", w[FrD], r[FrA, FrB], f[Rc], op[Opcd == 4, Xo1 == 592]);
    ins!(set: PsMerge11, "ps_merge11", "Paired Single Merge Low", w[FrD], r[FrA, FrB], f[Rc], op[Opcd == 4, Xo1 == 624]);
}
