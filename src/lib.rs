//! TTYRS - Teleprinter Display Emulator Library
//!
//! Version 0.2
//!
//! ITA2（Baudot）5ビットコードを受信して64桁x32行のグリッドに印字し、
//! グリーンバー用紙の紙送り表示としてピクセル単位のビデオ信号を
//! 合成するエミュレーションモジュールを提供

pub mod charset;
pub mod config;
pub mod eraser;
pub mod grid;
pub mod receiver;
pub mod sender;
pub mod teleprinter;
pub mod timing;
pub mod video;
