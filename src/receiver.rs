//! 文字受信機
//!
//! 外部送信装置からの5ビットコードを消費するステートマシン。
//! 「新文字あり」ストロボは非同期信号なので、2段サンプリングの
//! デバウンスを通してからエッジ検出する

use crate::charset::{CODE_CR, CODE_FIGS, CODE_LF, CODE_LTRS};
use crate::grid::{Cell, CharGrid, COL_MASK, ROW_MASK};

/// ストロボ同期チェーンの深さ（2ティック分の整定待ち）
pub const DEBOUNCE_DEPTH: usize = 2;

/// 復帰・桁あふれ時に戻る桁位置
///
/// 桁0ではなく桁1に戻る。元の機器の挙動をそのまま保存した非対称
pub const HOME_COLUMN: u8 = 1;

/// ストロボ信号の同期・エッジ検出器
///
/// DEBOUNCE_DEPTHティック連続で高レベルが観測されたときに1ティック幅の
/// パルスを1回だけ出す。再度パルスを出すには同じ深さの低レベル区間が必要
pub struct StrobeSync {
    history: [bool; DEBOUNCE_DEPTH],
    armed: bool,
}

impl Default for StrobeSync {
    fn default() -> Self {
        Self::new()
    }
}

impl StrobeSync {
    pub fn new() -> Self {
        StrobeSync { history: [false; DEBOUNCE_DEPTH], armed: true }
    }

    /// 毎ティックの生サンプルを取り込み、受理パルスを返す
    pub fn sample(&mut self, raw: bool) -> bool {
        self.history = [raw, self.history[0]];
        let stable_high = self.history.iter().all(|&s| s);
        let stable_low = self.history.iter().all(|&s| !s);

        if stable_low {
            self.armed = true;
        }
        if stable_high && self.armed {
            self.armed = false;
            return true;
        }
        false
    }
}

/// 書き込みカーソル
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    /// 桁 (0-63)
    pub column: u8,
    /// 行 (0-31)
    pub row: u8,
}

/// 受信コードの分類
///
/// ティック開始時点の状態に対する優先順位付きの判定。桁あふれは
/// LINE_FEEDと同じ扱いで行を進める
enum CodeAction {
    Figures,
    Letters,
    FeedLine,
    Print,
}

fn classify(code: u8, column_full: bool) -> CodeAction {
    match code {
        CODE_FIGS => CodeAction::Figures,
        CODE_LTRS => CodeAction::Letters,
        CODE_LF => CodeAction::FeedLine,
        _ if column_full => CodeAction::FeedLine,
        // 認識されないコードも印字扱い（フォントROMで引かれる）
        _ => CodeAction::Print,
    }
}

/// 文字受信ステートマシン
pub struct Receiver {
    pub cursor: Cursor,
    /// ケース状態（false = 文字、true = 数字）。次のシフトまで持続
    pub figures: bool,
    sync: StrobeSync,
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Receiver {
    pub fn new() -> Self {
        Receiver {
            cursor: Cursor { column: HOME_COLUMN, row: 0 },
            figures: false,
            sync: StrobeSync::new(),
        }
    }

    /// ストロボを毎ティック取り込む。受理パルスが立ったら真
    ///
    /// 消去中でもサンプリング自体は続ける必要があるため、
    /// consume() とは分離されている
    pub fn sense(&mut self, strobe: bool) -> bool {
        self.sync.sample(strobe)
    }

    /// 1文字を同期消費する（1ティックで完結）
    ///
    /// すべての条件はティック開始時点のカーソル状態に対して評価し、
    /// 結果の更新をまとめて適用する。評価途中で状態を書き換えない
    pub fn consume(&mut self, code: u8, grid: &mut CharGrid) {
        let code = code & 0x1F;
        let cur = self.cursor;
        let column_full = cur.column == COL_MASK;

        match classify(code, column_full) {
            CodeAction::Figures => self.figures = true,
            CodeAction::Letters => self.figures = false,
            CodeAction::FeedLine => {
                self.cursor.row = cur.row.wrapping_add(1) & ROW_MASK;
            }
            CodeAction::Print => {
                grid.write(cur.row, cur.column, Cell::new(self.figures, code));
                self.cursor.column = cur.column.wrapping_add(1) & COL_MASK;
            }
        }

        // 独立チェック: CR、またはティック開始時点で桁あふれなら桁1へ戻す
        // （桁0ではない）。上のPrint/FeedLineでの桁更新より優先される
        if code == CODE_CR || column_full {
            self.cursor.column = HOME_COLUMN;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::{CODE_CR, CODE_FIGS, CODE_LF, CODE_LTRS};

    fn feed(rx: &mut Receiver, grid: &mut CharGrid, code: u8) {
        rx.consume(code, grid);
        grid.clock();
    }

    #[test]
    fn test_short_pulse_is_ignored() {
        let mut sync = StrobeSync::new();
        // 1ティックだけのパルスは受理されない
        assert!(!sync.sample(true));
        assert!(!sync.sample(false));
        assert!(!sync.sample(false));
        assert!(!sync.sample(false));
    }

    #[test]
    fn test_long_pulse_fires_exactly_once() {
        let mut sync = StrobeSync::new();
        assert!(!sync.sample(true));
        assert!(sync.sample(true));
        // 高レベルが続いても再発火しない
        for _ in 0..10 {
            assert!(!sync.sample(true));
        }
        // 低レベル整定後に次の立ち上がりで再発火
        assert!(!sync.sample(false));
        assert!(!sync.sample(false));
        assert!(!sync.sample(true));
        assert!(sync.sample(true));
    }

    #[test]
    fn test_case_shift_applies_to_stored_cells() {
        let mut rx = Receiver::new();
        let mut grid = CharGrid::blank();

        feed(&mut rx, &mut grid, CODE_FIGS);
        feed(&mut rx, &mut grid, 0x01); // 数字ケースで '3'
        assert_eq!(grid.read_at(0, 1), Cell::new(true, 0x01));

        feed(&mut rx, &mut grid, CODE_LTRS);
        feed(&mut rx, &mut grid, 0x01); // 文字ケースで 'E'
        assert_eq!(grid.read_at(0, 2), Cell::new(false, 0x01));
        // 前に書いたセルは変わらない
        assert_eq!(grid.read_at(0, 1), Cell::new(true, 0x01));
    }

    #[test]
    fn test_carriage_return_homes_to_column_1() {
        let mut rx = Receiver::new();
        let mut grid = CharGrid::blank();
        for _ in 0..5 {
            feed(&mut rx, &mut grid, 0x03);
        }
        assert_eq!(rx.cursor.column, 6);
        feed(&mut rx, &mut grid, CODE_CR);
        assert_eq!(rx.cursor.column, HOME_COLUMN);
        assert_eq!(rx.cursor.row, 0);
    }

    #[test]
    fn test_line_feed_keeps_column() {
        let mut rx = Receiver::new();
        let mut grid = CharGrid::blank();
        feed(&mut rx, &mut grid, 0x03);
        feed(&mut rx, &mut grid, 0x03);
        let col = rx.cursor.column;
        feed(&mut rx, &mut grid, CODE_LF);
        assert_eq!(rx.cursor.row, 1);
        assert_eq!(rx.cursor.column, col);
    }

    #[test]
    fn test_row_wraps_at_32() {
        let mut rx = Receiver::new();
        let mut grid = CharGrid::blank();
        rx.cursor.row = 31;
        feed(&mut rx, &mut grid, CODE_LF);
        assert_eq!(rx.cursor.row, 0);
    }

    #[test]
    fn test_column_overflow_advances_row_once() {
        let mut rx = Receiver::new();
        let mut grid = CharGrid::blank();
        // 桁1から63個連続で印字コードを受信
        for _ in 0..63 {
            feed(&mut rx, &mut grid, 0x03);
        }
        // 63個目で桁あふれ → 行が1回だけ進み、桁は1に戻る（0ではない）
        assert_eq!(rx.cursor.row, 1);
        assert_eq!(rx.cursor.column, HOME_COLUMN);
        // あふれを起こした63個目は印字されない（行送りに化ける）
        assert_eq!(grid.read_at(0, 63), Cell::BLANK);
        assert_eq!(grid.read_at(0, 62), Cell::new(false, 0x03));
    }
}
