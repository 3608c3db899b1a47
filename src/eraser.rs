//! 消去機 / アイドル掃引
//!
//! 消去信号が立っている間は全セルをフリーラン掃引でブランク化し、
//! アイドル時（消去も受信も無いティック）はカーソルの1行下を
//! 連続的にブランク化して紙送りを模倣する

use crate::grid::{Cell, CharGrid, COL_MASK, GRID_CELLS, ROW_MASK};

/// 掃引アドレスカウンタのマスク（11ビット = 2048セル）
const SWEEP_MASK: u16 = (GRID_CELLS - 1) as u16;

/// 消去機
///
/// 完了信号は持たない。全消去は呼び出し側が消去信号を2048ティック以上
/// 保持することで全セルを網羅する
pub struct Eraser {
    /// フリーラン掃引カウンタ（消去中とアイドル中のみ進む）
    sweep: u16,
}

impl Default for Eraser {
    fn default() -> Self {
        Self::new()
    }
}

impl Eraser {
    pub fn new() -> Self {
        Eraser { sweep: 0 }
    }

    /// 1ティック分の掃引処理
    ///
    /// `erase` が真なら全消去掃引、偽かつこのティックに文字受信が
    /// 無ければアイドル掃引。受信があったティックはアイドル掃引を
    /// 1ティックだけ抑止する。書き込みを行ったら真を返す
    pub fn tick(
        &mut self,
        erase: bool,
        received: bool,
        cursor_row: u8,
        grid: &mut CharGrid,
    ) -> bool {
        if erase {
            // 全消去: 11ビットアドレスをそのまま掃引
            let addr = self.sweep & SWEEP_MASK;
            grid.write((addr >> 6) as u8 & ROW_MASK, (addr as u8) & COL_MASK, Cell::BLANK);
            self.sweep = self.sweep.wrapping_add(1) & SWEEP_MASK;
            true
        } else if !received {
            // アイドル掃引: カーソルの1行下を桁カウンタで順にブランク化
            let row = cursor_row.wrapping_add(1) & ROW_MASK;
            grid.write(row, (self.sweep as u8) & COL_MASK, Cell::BLANK);
            self.sweep = self.sweep.wrapping_add(1) & SWEEP_MASK;
            true
        } else {
            false
        }
    }
}
