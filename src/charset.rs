//! 文字セットROM（フォントソース）
//!
//! ITA2（Baudot）5ビットコード用の内蔵フォントと、外部フォントROMを
//! 差し替えるためのトレイトシーム。ROMは12ビットキー
//! （ケース付き6ビットコード + 5ビット行 + 極性ビット）で引かれ、
//! 1行分の16ビットパターンを組み合わせ回路的に（同一ティック内で）返す

use crate::grid::Cell;

/// ブランク/NUL（消去時に書き込まれるコード）
pub const CODE_NUL: u8 = 0x00;
/// 改行（LINE FEED）
pub const CODE_LF: u8 = 0x02;
/// 復帰（CARRIAGE RETURN）
pub const CODE_CR: u8 = 0x08;
/// 数字ケースへのシフト（FIGURES）
pub const CODE_FIGS: u8 = 0x1B;
/// 文字ケースへのシフト（LETTERS）
pub const CODE_LTRS: u8 = 0x1F;

/// 文字ケースのコード→ASCII対応表（送信側の逆引きにも使用）
/// 制御コード位置は '\0'
pub const LTRS_CHARS: [char; 32] = [
    '\0', 'E', '\0', 'A', ' ', 'S', 'I', 'U',
    '\0', 'D', 'R', 'J', 'N', 'F', 'C', 'K',
    'T', 'Z', 'L', 'W', 'H', 'Y', 'P', 'Q',
    'O', 'B', 'G', '\0', 'M', 'X', 'V', '\0',
];

/// 数字ケースのコード→ASCII対応表（US-TTY配列）
pub const FIGS_CHARS: [char; 32] = [
    '\0', '3', '\0', '-', ' ', '\0', '8', '7',
    '\0', '$', '4', '\'', ',', '!', ':', '(',
    '5', '"', ')', '2', '#', '6', '0', '1',
    '9', '?', '&', '\0', '.', '/', ';', '\0',
];

/// フォントROMのインターフェース
///
/// 外部フォントROMを差し替えるためのシーム。`sub_row` はグリフ内の
/// スキャンライン（0-31）、`ink_high` は極性ビット:
/// false = セットビットが紙（インク無し）、true = セットビットがインク
pub trait CharsetRom {
    fn row_pattern(&self, cell: Cell, sub_row: u8, ink_high: bool) -> u16;
}

/// 内蔵文字セット
///
/// 8x8のグリフビットマップを横2倍・縦4倍に展開して16x32セルを埋める。
/// 各行はビット6が左端（描画時は 0x40 >> x で取り出す）
pub struct BuiltinCharset;

/// 文字ケース（LETTERS）のグリフ: 32文字 x 8バイト
const FONT_LTRS: [[u8; 8]; 32] = [
    // $00: NUL
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $01: E
    [0x3E, 0x20, 0x20, 0x3C, 0x20, 0x20, 0x3E, 0x00],
    // $02: LF
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $03: A
    [0x08, 0x14, 0x22, 0x22, 0x3E, 0x22, 0x22, 0x00],
    // $04: Space
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $05: S
    [0x1C, 0x22, 0x20, 0x1C, 0x02, 0x22, 0x1C, 0x00],
    // $06: I
    [0x1C, 0x08, 0x08, 0x08, 0x08, 0x08, 0x1C, 0x00],
    // $07: U
    [0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x1C, 0x00],
    // $08: CR
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $09: D
    [0x3C, 0x22, 0x22, 0x22, 0x22, 0x22, 0x3C, 0x00],
    // $0A: R
    [0x3C, 0x22, 0x22, 0x3C, 0x28, 0x24, 0x22, 0x00],
    // $0B: J
    [0x02, 0x02, 0x02, 0x02, 0x02, 0x22, 0x1C, 0x00],
    // $0C: N
    [0x22, 0x32, 0x2A, 0x26, 0x22, 0x22, 0x22, 0x00],
    // $0D: F
    [0x3E, 0x20, 0x20, 0x3C, 0x20, 0x20, 0x20, 0x00],
    // $0E: C
    [0x1C, 0x22, 0x20, 0x20, 0x20, 0x22, 0x1C, 0x00],
    // $0F: K
    [0x22, 0x24, 0x28, 0x30, 0x28, 0x24, 0x22, 0x00],
    // $10: T
    [0x3E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x08, 0x00],
    // $11: Z
    [0x3E, 0x02, 0x04, 0x08, 0x10, 0x20, 0x3E, 0x00],
    // $12: L
    [0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x3E, 0x00],
    // $13: W
    [0x22, 0x22, 0x22, 0x2A, 0x2A, 0x36, 0x22, 0x00],
    // $14: H
    [0x22, 0x22, 0x22, 0x3E, 0x22, 0x22, 0x22, 0x00],
    // $15: Y
    [0x22, 0x22, 0x14, 0x08, 0x08, 0x08, 0x08, 0x00],
    // $16: P
    [0x3C, 0x22, 0x22, 0x3C, 0x20, 0x20, 0x20, 0x00],
    // $17: Q
    [0x1C, 0x22, 0x22, 0x22, 0x2A, 0x24, 0x1A, 0x00],
    // $18: O
    [0x1C, 0x22, 0x22, 0x22, 0x22, 0x22, 0x1C, 0x00],
    // $19: B
    [0x3C, 0x22, 0x22, 0x3C, 0x22, 0x22, 0x3C, 0x00],
    // $1A: G
    [0x1E, 0x20, 0x20, 0x2E, 0x22, 0x22, 0x1E, 0x00],
    // $1B: FIGS
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $1C: M
    [0x22, 0x36, 0x2A, 0x2A, 0x22, 0x22, 0x22, 0x00],
    // $1D: X
    [0x22, 0x22, 0x14, 0x08, 0x14, 0x22, 0x22, 0x00],
    // $1E: V
    [0x22, 0x22, 0x22, 0x22, 0x14, 0x14, 0x08, 0x00],
    // $1F: LTRS
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
];

/// 数字ケース（FIGURES）のグリフ: 32文字 x 8バイト
const FONT_FIGS: [[u8; 8]; 32] = [
    // $00: NUL
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $01: 3
    [0x1C, 0x22, 0x02, 0x0C, 0x02, 0x22, 0x1C, 0x00],
    // $02: LF
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $03: -
    [0x00, 0x00, 0x00, 0x3E, 0x00, 0x00, 0x00, 0x00],
    // $04: Space
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $05: BELL（表示なし）
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $06: 8
    [0x1C, 0x22, 0x22, 0x1C, 0x22, 0x22, 0x1C, 0x00],
    // $07: 7
    [0x3E, 0x02, 0x04, 0x08, 0x10, 0x10, 0x10, 0x00],
    // $08: CR
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $09: $
    [0x08, 0x1E, 0x28, 0x1C, 0x0A, 0x3C, 0x08, 0x00],
    // $0A: 4
    [0x04, 0x0C, 0x14, 0x24, 0x3E, 0x04, 0x04, 0x00],
    // $0B: '
    [0x08, 0x08, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $0C: ,
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x08, 0x08, 0x10],
    // $0D: !
    [0x08, 0x08, 0x08, 0x08, 0x08, 0x00, 0x08, 0x00],
    // $0E: :
    [0x00, 0x00, 0x08, 0x00, 0x00, 0x08, 0x00, 0x00],
    // $0F: (
    [0x04, 0x08, 0x10, 0x10, 0x10, 0x08, 0x04, 0x00],
    // $10: 5
    [0x3E, 0x20, 0x3C, 0x02, 0x02, 0x22, 0x1C, 0x00],
    // $11: "
    [0x14, 0x14, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $12: )
    [0x10, 0x08, 0x04, 0x04, 0x04, 0x08, 0x10, 0x00],
    // $13: 2
    [0x1C, 0x22, 0x02, 0x0C, 0x10, 0x20, 0x3E, 0x00],
    // $14: #
    [0x14, 0x14, 0x3E, 0x14, 0x3E, 0x14, 0x14, 0x00],
    // $15: 6
    [0x0E, 0x10, 0x20, 0x3C, 0x22, 0x22, 0x1C, 0x00],
    // $16: 0
    [0x1C, 0x22, 0x26, 0x2A, 0x32, 0x22, 0x1C, 0x00],
    // $17: 1
    [0x08, 0x18, 0x08, 0x08, 0x08, 0x08, 0x1C, 0x00],
    // $18: 9
    [0x1C, 0x22, 0x22, 0x1E, 0x02, 0x04, 0x38, 0x00],
    // $19: ?
    [0x1C, 0x22, 0x02, 0x04, 0x08, 0x00, 0x08, 0x00],
    // $1A: &
    [0x10, 0x28, 0x28, 0x10, 0x2A, 0x24, 0x1A, 0x00],
    // $1B: FIGS
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    // $1C: .
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08, 0x00],
    // $1D: /
    [0x00, 0x02, 0x04, 0x08, 0x10, 0x20, 0x00, 0x00],
    // $1E: ;
    [0x00, 0x00, 0x08, 0x00, 0x00, 0x08, 0x08, 0x10],
    // $1F: LTRS
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
];

impl CharsetRom for BuiltinCharset {
    fn row_pattern(&self, cell: Cell, sub_row: u8, ink_high: bool) -> u16 {
        let bank = if cell.figures() { &FONT_FIGS } else { &FONT_LTRS };
        // 32スキャンラインのセルを8行フォントで埋める（各行4ライン）
        let byte = bank[cell.code() as usize][((sub_row & 0x1F) >> 2) as usize];

        // ビット6が左端のフォントデータを横2倍の14ピクセルに展開
        // （16ビットパターンの bit14-1、両端1ピクセルは常に空き）
        let mut ink = 0u16;
        for x in 0..7 {
            if byte & (0x40 >> x) != 0 {
                ink |= 0x6000 >> (x * 2);
            }
        }

        // 極性: 既定はセットビット = 紙（インク無し）
        if ink_high {
            ink
        } else {
            !ink
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_codes_render_empty() {
        let rom = BuiltinCharset;
        for &code in &[CODE_NUL, CODE_LF, CODE_CR, CODE_FIGS, CODE_LTRS] {
            for sub_row in 0..32 {
                let pat = rom.row_pattern(Cell::new(false, code), sub_row, true);
                assert_eq!(pat, 0, "code {:#04x} row {} should be blank", code, sub_row);
            }
        }
    }

    #[test]
    fn test_letter_t_has_full_top_bar() {
        let rom = BuiltinCharset;
        // 'T' = code $10、最上段の4ラインは 0x3E → 横2倍で bit12-3
        let pat = rom.row_pattern(Cell::new(false, 0x10), 0, true);
        assert_eq!(pat, 0x1FF8);
        assert_eq!(rom.row_pattern(Cell::new(false, 0x10), 3, true), pat);
    }

    #[test]
    fn test_polarity_bit_inverts() {
        let rom = BuiltinCharset;
        let cell = Cell::new(false, 0x03); // 'A'
        for sub_row in 0..32 {
            let ink = rom.row_pattern(cell, sub_row, true);
            let paper = rom.row_pattern(cell, sub_row, false);
            assert_eq!(ink, !paper);
        }
    }

    #[test]
    fn test_case_selects_bank() {
        let rom = BuiltinCharset;
        // コード$01は文字ケースで 'E'、数字ケースで '3'
        let e = rom.row_pattern(Cell::new(false, 0x01), 4, true);
        let three = rom.row_pattern(Cell::new(true, 0x01), 4, true);
        assert_ne!(e, three);
    }

    #[test]
    fn test_code_tables_cover_all_codes() {
        assert_eq!(LTRS_CHARS.len(), 32);
        assert_eq!(FIGS_CHARS.len(), 32);
        assert_eq!(LTRS_CHARS[CODE_LTRS as usize], '\0');
        assert_eq!(FIGS_CHARS[CODE_FIGS as usize], '\0');
        assert_eq!(LTRS_CHARS[0x10], 'T');
        assert_eq!(FIGS_CHARS[0x16], '0');
    }
}
