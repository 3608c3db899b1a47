//! テレプリンタエミュレータ
//!
//! タイミングマッパー、グリッド、受信機、消去機、ラスタライザ、
//! コンポジタを統合し、1ピクセルクロック = 1ティックで駆動する

use crate::charset::{BuiltinCharset, CharsetRom};
use crate::eraser::Eraser;
use crate::grid::CharGrid;
use crate::receiver::Receiver;
use crate::timing::TimingMapper;
use crate::video::{GlyphRasterizer, PaperCompositor, Rgb};

/// 1ティック分の外部入力
///
/// ラスタカウンタは外部のタイミング生成器、コードとストロボは
/// 外部の送信装置が供給する
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// 水平位置カウンタ
    pub hpos: u16,
    /// 垂直位置カウンタ
    pub vpos: u16,
    /// 5ビット文字コード
    pub code: u8,
    /// 「新文字あり」ストロボ（非同期、内部でデバウンスされる）
    pub strobe: bool,
    /// 全消去レベル信号
    pub erase: bool,
}

/// テレプリンタエミュレータのメイン構造体
pub struct Teleprinter<R: CharsetRom> {
    /// タイミングマッパー
    pub timing: TimingMapper,
    /// 文字グリッドストア
    pub grid: CharGrid,
    /// 文字受信機
    pub receiver: Receiver,
    /// 消去機 / アイドル掃引
    pub eraser: Eraser,
    /// グリフラスタライザ
    pub raster: GlyphRasterizer,
    /// 紙コンポジタ
    pub compositor: PaperCompositor,
    /// フォントROM
    pub charset: R,
    /// 累積ティック数
    pub total_ticks: u64,
}

impl Teleprinter<BuiltinCharset> {
    /// 内蔵文字セットでエミュレータを生成
    pub fn new() -> Self {
        Self::with_charset(BuiltinCharset)
    }
}

impl Default for Teleprinter<BuiltinCharset> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CharsetRom> Teleprinter<R> {
    /// 外部フォントROMを差してエミュレータを生成
    pub fn with_charset(charset: R) -> Self {
        Teleprinter {
            timing: TimingMapper::new(),
            grid: CharGrid::new(),
            receiver: Receiver::new(),
            eraser: Eraser::new(),
            raster: GlyphRasterizer::new(),
            compositor: PaperCompositor,
            charset,
            total_ticks: 0,
        }
    }

    /// 1ティックを実行し、現在のラスタ位置のピクセル色を返す
    ///
    /// 読み出し側（表示パイプライン）を先に評価し、そのあとで
    /// 書き込み側を1ライタだけ動かす。グリッドへの書き込みは
    /// ティック終端でコミットされ、次ティック以降の読み出しに見える
    pub fn tick(&mut self, input: &TickInput) -> Rgb {
        // 読み出し側: 位置 → セル → インクビット → 合成
        let flags = self.timing.tick(input.hpos, input.vpos);
        let cell = self.grid.read(CharGrid::addr(flags.row, flags.column));
        let ink = self.raster.tick(flags.text_x, cell, flags.sub_row, &self.charset);
        let rgb = self
            .compositor
            .compose(&flags, ink, input.hpos, self.receiver.cursor.row);

        // 書き込み側: 消去 > 受信 > アイドル掃引 の排他
        // ストロボのサンプリングは消去中も止めない
        let pulse = self.receiver.sense(input.strobe);
        let received = pulse && !input.erase;
        if received {
            self.receiver.consume(input.code, &mut self.grid);
        }
        self.eraser
            .tick(input.erase, received, self.receiver.cursor.row, &mut self.grid);
        self.grid.clock();

        self.total_ticks += 1;
        rgb
    }
}
