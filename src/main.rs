//! TTYRS - Teleprinter Display Emulator in Rust
//!
//! Version 0.2
//!
//! TTYRS は Rust で書かれたテレプリンタ表示エミュレータです。
//! ITA2（Baudot）コードの受信ストリームをグリーンバー用紙の
//! 印字としてリアルタイムに描画します。
//!
//! # 機能
//! - 64桁 x 32行の文字グリッド
//! - ケースシフト・復帰・改行・消去のステートマシン
//! - スプロケット穴・切り取り破線・縞シェーディングの紙表現
//! - テキストファイルの自動送信
//!
//! # 使用方法
//! ```
//! ttyrs --text banner.txt --cps 10
//! ```

use ttyrs::config::Config;
use ttyrs::sender::TextSender;
use ttyrs::teleprinter::{Teleprinter, TickInput};
use ttyrs::timing::{H_ACTIVE, H_TOTAL, V_ACTIVE, V_TOTAL};

use clap::Parser;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::fs;

/// 1フレームのティック数（ブランキング込み）
const TICKS_PER_FRAME: u64 = H_TOTAL as u64 * V_TOTAL as u64;
/// フレームレート
const FRAMES_PER_SECOND: u64 = 60;

/// TTYRS - Teleprinter Display Emulator in Rust
#[derive(Parser, Debug)]
#[command(name = "ttyrs")]
#[command(author = "TTYRS Project")]
#[command(version = "0.2.0")]
#[command(about = "TTYRS - Teleprinter Display Emulator in Rust", long_about = None)]
struct Args {
    /// 印字するテキストファイル
    #[arg(short, long)]
    text: Option<String>,

    /// 送信速度（文字/秒）
    #[arg(short, long)]
    cps: Option<u32>,

    /// 起動時に全セルを消去する
    #[arg(long)]
    erase_on_start: bool,

    /// ウィンドウ無しで指定フレーム数だけ描画して終了
    #[arg(long)]
    headless_frames: Option<u32>,

    /// ヘッドレス実行の最終フレームをPNGで保存するパス
    #[arg(long)]
    screenshot: Option<String>,
}

/// スクリーンショットをPNGで保存
fn save_screenshot(filename: &str, fb: &[u32], width: usize, height: usize) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(filename)?;
    let w = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;

    let mut rgb_data = Vec::with_capacity(width * height * 3);
    for pixel in fb.iter() {
        rgb_data.push(((pixel >> 16) & 0xFF) as u8);
        rgb_data.push(((pixel >> 8) & 0xFF) as u8);
        rgb_data.push((pixel & 0xFF) as u8);
    }

    writer.write_image_data(&rgb_data)?;
    Ok(())
}

/// ラスタタイミング生成器（外部コラボレータの参照実装）
///
/// 1ティック = 1ピクセル。フレーム内で単調に進み、フレーム毎にラップする
struct RasterBeam {
    hpos: u16,
    vpos: u16,
}

impl RasterBeam {
    fn new() -> Self {
        RasterBeam { hpos: 0, vpos: 0 }
    }

    fn advance(&mut self) {
        self.hpos += 1;
        if self.hpos == H_TOTAL {
            self.hpos = 0;
            self.vpos += 1;
            if self.vpos == V_TOTAL {
                self.vpos = 0;
            }
        }
    }
}

/// 1フレーム分のティックを実行し、表示期間のピクセルをフレームバッファに書く
fn render_frame(
    tp: &mut Teleprinter<ttyrs::charset::BuiltinCharset>,
    sender: &mut TextSender,
    beam: &mut RasterBeam,
    erase: bool,
    framebuffer: &mut [u32],
) {
    for _ in 0..TICKS_PER_FRAME {
        let (code, strobe) = sender.tick();
        let rgb = tp.tick(&TickInput {
            hpos: beam.hpos,
            vpos: beam.vpos,
            code,
            strobe,
            erase,
        });
        if beam.hpos < H_ACTIVE && beam.vpos < V_ACTIVE {
            framebuffer[beam.vpos as usize * H_ACTIVE as usize + beam.hpos as usize] =
                rgb.to_argb();
        }
        beam.advance();
    }
}

/// ヘッドレス実行（スモークラン用）
fn run_headless(
    tp: &mut Teleprinter<ttyrs::charset::BuiltinCharset>,
    sender: &mut TextSender,
    frames: u32,
    erase_frames: u32,
    screenshot: Option<&str>,
) {
    let mut beam = RasterBeam::new();
    let mut framebuffer = vec![0u32; H_ACTIVE as usize * V_ACTIVE as usize];

    for frame in 0..frames {
        render_frame(tp, sender, &mut beam, frame < erase_frames, &mut framebuffer);
    }
    log::info!("Rendered {} headless frames", frames);

    if let Some(path) = screenshot {
        match save_screenshot(path, &framebuffer, H_ACTIVE as usize, V_ACTIVE as usize) {
            Ok(()) => log::info!("Saved screenshot to {}", path),
            Err(e) => eprintln!("Failed to save screenshot: {}", e),
        }
    }
}

fn run_with_window(
    tp: &mut Teleprinter<ttyrs::charset::BuiltinCharset>,
    sender: &mut TextSender,
    config: &Config,
    erase_frames: u32,
) {
    let mut window = match Window::new(
        "TTYRS - Teleprinter Display Emulator",
        H_ACTIVE as usize,
        V_ACTIVE as usize,
        WindowOptions {
            resize: true,
            scale: minifb::Scale::X1,
            ..WindowOptions::default()
        },
    ) {
        Ok(win) => win,
        Err(e) => {
            eprintln!("Failed to create window: {}", e);
            return;
        }
    };

    window.set_target_fps(FRAMES_PER_SECOND as usize);

    let mut beam = RasterBeam::new();
    let mut framebuffer = vec![0u32; H_ACTIVE as usize * V_ACTIVE as usize];
    let mut frame_count: u64 = 0;
    let mut paused = false;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            paused = !paused;
        }

        if !paused {
            // Eキー押下中、または起動時消去の残りフレームは消去信号を立てる
            let erase = window.is_key_down(Key::E) || frame_count < erase_frames as u64;
            if erase {
                log::debug!("erase asserted (frame {})", frame_count);
            }
            render_frame(tp, sender, &mut beam, erase, &mut framebuffer);
            frame_count += 1;
        }

        if window.is_key_pressed(Key::F5, KeyRepeat::No) {
            if let Err(e) = fs::create_dir_all(&config.screenshot_dir) {
                eprintln!("Failed to create {}: {}", config.screenshot_dir, e);
            } else {
                let path = format!("{}/ttyrs_{:06}.png", config.screenshot_dir, frame_count);
                match save_screenshot(&path, &framebuffer, H_ACTIVE as usize, V_ACTIVE as usize) {
                    Ok(()) => log::info!("Saved screenshot to {}", path),
                    Err(e) => eprintln!("Failed to save screenshot: {}", e),
                }
            }
        }

        let _ = window.update_with_buffer(&framebuffer, H_ACTIVE as usize, V_ACTIVE as usize);
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::load();

    if let Some(cps) = args.cps {
        config.chars_per_second = cps;
    }
    if args.erase_on_start {
        config.erase_on_start = true;
    }
    if let Some(ref path) = args.text {
        config.last_text = Some(path.clone());
    }

    // 文字間隔 = ティックレート / 送信速度
    let tick_rate = TICKS_PER_FRAME * FRAMES_PER_SECOND;
    let interval = (tick_rate / config.chars_per_second.max(1) as u64) as u32;
    let mut sender = TextSender::new(interval);

    if let Some(ref path) = config.last_text {
        match fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loaded text feed from {} ({} bytes)", path, text.len());
                sender.queue_str(&text);
            }
            Err(e) => {
                eprintln!("Failed to read {}: {}", path, e);
                std::process::exit(1);
            }
        }
    }

    let mut tp = Teleprinter::new();

    // 全消去には2048ティック以上必要。フレーム単位で十分に余裕がある
    let erase_frames = if config.erase_on_start { 1 } else { 0 };

    if let Some(frames) = args.headless_frames {
        run_headless(&mut tp, &mut sender, frames, erase_frames, args.screenshot.as_deref());
    } else {
        run_with_window(&mut tp, &mut sender, &config, erase_frames);
    }

    if let Err(e) = config.save() {
        log::warn!("{}", e);
    }
}
