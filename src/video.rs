//! グリフラスタライザと紙コンポジタ
//!
//! グリッドから読んだセルをフォントROMでピクセル化し、グリーンバー
//! シェーディング・スプロケット穴・切り取り破線と合成して最終色を作る

use crate::charset::CharsetRom;
use crate::grid::Cell;
use crate::timing::{PaperFlags, CELL_HEIGHT, CELL_WIDTH};

/// 1ピクセルの出力色（8ビット3チャンネル）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// フレームバッファ用の0RGB形式にパック
    pub fn to_argb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

/// グリフラスタライザ
///
/// 16ビットの行パターンを1個ラッチし、16ティック（グリフ幅）毎に
/// フォントROMから取り直す
pub struct GlyphRasterizer {
    pattern: u16,
}

impl Default for GlyphRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphRasterizer {
    pub fn new() -> Self {
        GlyphRasterizer { pattern: 0 }
    }

    /// 1ティック分のピクセル化
    ///
    /// 戻り値はインク強度: 0xFF = インク無し（紙が見える）、0x00 = インク。
    /// パターンのセットビットが「インク無し」を意味する極性に注意
    pub fn tick<R: CharsetRom>(&mut self, text_x: u16, cell: Cell, sub_row: u8, rom: &R) -> u8 {
        let phase = text_x & (CELL_WIDTH - 1);
        if phase == 0 {
            self.pattern = rom.row_pattern(cell, sub_row, false);
        }
        // ビット順は自然なインデックスの逆: (15 - phase) ビット目を取り出す
        let bit = (self.pattern >> (15 - phase)) & 1;
        if bit != 0 {
            0xFF
        } else {
            0x00
        }
    }
}

/// 紙コンポジタ
pub struct PaperCompositor;

impl Default for PaperCompositor {
    fn default() -> Self {
        PaperCompositor
    }
}

impl PaperCompositor {
    /// 背景シェーディングバイトを計算
    ///
    /// 通常は0xFF(ビットマスクとしては無操作)。垂直位置のビット5と
    /// カーソル行のビット0のXORが選ぶ2行周期の縞の上では0x80、
    /// 縞の最初と最後のスキャンラインでは0x00(区切り線)
    pub fn shade(&self, vpos: u16, hpos: u16, cursor_row: u8) -> u8 {
        let stripe = ((vpos >> 5) as u8 ^ cursor_row) & 1;
        if stripe == 0 && hpos != 0 {
            let line = vpos & (CELL_HEIGHT - 1);
            if line == 0 || line == CELL_HEIGHT - 1 {
                0x00
            } else {
                0x80
            }
        } else {
            0xFF
        }
    }

    /// インク強度と各マスクから最終色を合成
    ///
    /// シェーディングは赤と青のみを削って緑を素通しするため、
    /// 縞の上は緑がかって見える。紙の外・穴・破線は純黒
    pub fn compose(&self, flags: &PaperFlags, ink: u8, hpos: u16, cursor_row: u8) -> Rgb {
        if flags.on_paper && !flags.over_hole && !flags.on_tear_line {
            let shade = self.shade(flags.text_y, hpos, cursor_row);
            Rgb { r: ink & shade, g: ink, b: ink & shade }
        } else {
            Rgb::BLACK
        }
    }
}
