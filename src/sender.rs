//! 送信装置モデル
//!
//! 本体の外にある「文字送信装置」の参照実装。
//! ASCIIテキストをITA2コード列（ケースシフト挿入込み）に変換し、
//! 一定ティック間隔でコードとストロボを供給する

use std::collections::VecDeque;

use crate::charset::{CODE_CR, CODE_FIGS, CODE_LF, CODE_LTRS, FIGS_CHARS, LTRS_CHARS};

/// ストロボを高レベルに保持するティック数（デバウンス2ティック以上必要）
pub const STROBE_HOLD_TICKS: u32 = 4;

/// テキスト送信機
pub struct TextSender {
    /// 送信待ちのコード列
    queue: VecDeque<u8>,
    /// エンコーダ側のケース状態
    figures: bool,
    /// 文字間のティック間隔
    interval: u32,
    /// 次の文字までの残りティック
    countdown: u32,
    /// 現在コード線に乗っている値
    current: u8,
    /// ストロボの残り保持ティック
    strobe_left: u32,
}

impl TextSender {
    /// 文字間隔（ティック）を指定して生成
    ///
    /// ストロボの保持と整定に必要な最低間隔より短くは設定できない
    pub fn new(interval: u32) -> Self {
        TextSender {
            queue: VecDeque::new(),
            figures: false,
            interval: interval.max(STROBE_HOLD_TICKS * 2),
            countdown: 0,
            current: 0,
            strobe_left: 0,
        }
    }

    /// ASCIIテキストをエンコードして送信キューに積む
    ///
    /// 改行はCR+LFの2コードになる。どちらのケースにも無い文字は捨てる
    pub fn queue_str(&mut self, text: &str) {
        for ch in text.chars() {
            let ch = ch.to_ascii_uppercase();
            if ch == '\n' {
                self.queue.push_back(CODE_CR);
                self.queue.push_back(CODE_LF);
                continue;
            }
            if ch == '\r' {
                continue;
            }
            // 現在のケースを優先して引き、無ければシフトを挿入
            let in_current = Self::find(ch, self.figures);
            let code = match in_current {
                Some(code) => code,
                None => match Self::find(ch, !self.figures) {
                    Some(code) => {
                        self.figures = !self.figures;
                        self.queue
                            .push_back(if self.figures { CODE_FIGS } else { CODE_LTRS });
                        code
                    }
                    None => {
                        log::debug!("no ITA2 code for {:?}, dropped", ch);
                        continue;
                    }
                },
            };
            self.queue.push_back(code);
        }
        log::info!("queued {} codes", self.queue.len());
    }

    fn find(ch: char, figures: bool) -> Option<u8> {
        if ch == '\0' {
            return None;
        }
        let table = if figures { &FIGS_CHARS } else { &LTRS_CHARS };
        table.iter().position(|&c| c == ch).map(|i| i as u8)
    }

    /// キューとストロボが掃けたか
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.strobe_left == 0
    }

    /// 1ティック分進め、(コード線, ストロボ線) の状態を返す
    pub fn tick(&mut self) -> (u8, bool) {
        if self.countdown > 0 {
            self.countdown -= 1;
        }
        if self.countdown == 0 {
            if let Some(code) = self.queue.pop_front() {
                self.current = code;
                self.strobe_left = STROBE_HOLD_TICKS;
                self.countdown = self.interval;
            }
        }
        let strobe = self.strobe_left > 0;
        if strobe {
            self.strobe_left -= 1;
        }
        (self.current, strobe)
    }
}
