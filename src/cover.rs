//! Programmatic playlist cover generation.
//!
//! Renders a deterministic two-color vertical gradient derived from the
//! playlist title, overlays the wrapped title text, and encodes the result
//! as a JPEG small enough for the provider's cover-upload limit. Text is
//! rendered from an embedded 5x7 bitmap font so the crate carries no font
//! asset; titles are drawn uppercased.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use image::{ImageBuffer, Rgb, codecs::jpeg::JpegEncoder};

use crate::error::SpotifyError;

pub const COVER_SIZE: u32 = 640;
const JPEG_QUALITY: u8 = 80;
const MAX_LINE_CHARS: usize = 16;
const MAX_LINES: usize = 3;
const GLYPH_SCALE: u32 = 6;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_GAP: u32 = 1;

/// Gradient endpoint pairs, picked by title hash.
const PALETTES: &[([u8; 3], [u8; 3])] = &[
    ([30, 58, 138], [236, 72, 153]),  // indigo -> pink
    ([15, 118, 110], [250, 204, 21]), // teal -> amber
    ([88, 28, 135], [56, 189, 248]),  // violet -> sky
    ([153, 27, 27], [251, 146, 60]),  // crimson -> orange
    ([22, 101, 52], [163, 230, 53]),  // forest -> lime
];

/// Generates the JPEG cover for a playlist title. Deterministic: the same
/// title always produces the same bytes.
pub fn generate_cover(title: &str) -> Result<Vec<u8>, SpotifyError> {
    let (top, bottom) = palette_for(title);

    let mut img = ImageBuffer::from_fn(COVER_SIZE, COVER_SIZE, |_, y| {
        let t = y as f32 / (COVER_SIZE - 1) as f32;
        Rgb([
            lerp(top[0], bottom[0], t),
            lerp(top[1], bottom[1], t),
            lerp(top[2], bottom[2], t),
        ])
    });

    let lines = wrap_title(title, MAX_LINE_CHARS);
    draw_lines(&mut img, &lines);

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    encoder
        .encode_image(&img)
        .map_err(|e| SpotifyError::ArtworkUpload(e.to_string()))?;
    Ok(jpeg)
}

/// Wraps a title into at most [`MAX_LINES`] lines of `max_chars` characters,
/// breaking on whitespace. Overlong single words are hard-split; an
/// overflowing last line is ellipsized.
pub fn wrap_title(title: &str, max_chars: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in title.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            let tail: String = word.chars().skip(max_chars).collect();
            lines.push(head);
            word = tail;
        }
        if word.is_empty() {
            continue;
        }

        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > MAX_LINES {
        lines.truncate(MAX_LINES);
        let last = &mut lines[MAX_LINES - 1];
        while last.chars().count() > max_chars.saturating_sub(1) {
            last.pop();
        }
        last.push('…');
    }

    lines
}

fn palette_for(title: &str) -> ([u8; 3], [u8; 3]) {
    let mut hasher = DefaultHasher::new();
    title.hash(&mut hasher);
    PALETTES[(hasher.finish() as usize) % PALETTES.len()]
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

fn draw_lines(img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>, lines: &[String]) {
    let advance = (GLYPH_WIDTH + GLYPH_GAP) * GLYPH_SCALE;
    let line_height = (GLYPH_HEIGHT + 2) * GLYPH_SCALE;
    let block_height = lines.len() as u32 * line_height;
    let mut y = COVER_SIZE.saturating_sub(block_height) / 2;

    for line in lines {
        let upper = line.to_uppercase();
        let width = upper.chars().count() as u32 * advance;
        let x = COVER_SIZE.saturating_sub(width) / 2;
        draw_text(img, &upper, x, y);
        y += line_height;
    }
}

fn draw_text(img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>, text: &str, x: u32, y: u32) {
    let mut cursor = x;
    for c in text.chars() {
        if let Some(columns) = glyph(c) {
            for (col, bits) in columns.iter().enumerate() {
                for row in 0..GLYPH_HEIGHT {
                    if (bits >> row) & 1 == 1 {
                        fill_cell(
                            img,
                            cursor + col as u32 * GLYPH_SCALE,
                            y + row * GLYPH_SCALE,
                        );
                    }
                }
            }
        }
        cursor += (GLYPH_WIDTH + GLYPH_GAP) * GLYPH_SCALE;
    }
}

fn fill_cell(img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>, x: u32, y: u32) {
    for dy in 0..GLYPH_SCALE {
        for dx in 0..GLYPH_SCALE {
            let (px, py) = (x + dx, y + dy);
            if px < COVER_SIZE && py < COVER_SIZE {
                img.put_pixel(px, py, Rgb([255, 255, 255]));
            }
        }
    }
}

// Classic 5x7 column font, LSB at the top row. Unknown characters render as
// blank space.
fn glyph(c: char) -> Option<[u8; 5]> {
    let columns = match c {
        'A' => [0x7E, 0x11, 0x11, 0x11, 0x7E],
        'B' => [0x7F, 0x49, 0x49, 0x49, 0x36],
        'C' => [0x3E, 0x41, 0x41, 0x41, 0x22],
        'D' => [0x7F, 0x41, 0x41, 0x22, 0x1C],
        'E' => [0x7F, 0x49, 0x49, 0x49, 0x41],
        'F' => [0x7F, 0x09, 0x09, 0x09, 0x01],
        'G' => [0x3E, 0x41, 0x49, 0x49, 0x7A],
        'H' => [0x7F, 0x08, 0x08, 0x08, 0x7F],
        'I' => [0x00, 0x41, 0x7F, 0x41, 0x00],
        'J' => [0x20, 0x40, 0x41, 0x3F, 0x01],
        'K' => [0x7F, 0x08, 0x14, 0x22, 0x41],
        'L' => [0x7F, 0x40, 0x40, 0x40, 0x40],
        'M' => [0x7F, 0x02, 0x0C, 0x02, 0x7F],
        'N' => [0x7F, 0x04, 0x08, 0x10, 0x7F],
        'O' => [0x3E, 0x41, 0x41, 0x41, 0x3E],
        'P' => [0x7F, 0x09, 0x09, 0x09, 0x06],
        'Q' => [0x3E, 0x41, 0x51, 0x21, 0x5E],
        'R' => [0x7F, 0x09, 0x19, 0x29, 0x46],
        'S' => [0x46, 0x49, 0x49, 0x49, 0x31],
        'T' => [0x01, 0x01, 0x7F, 0x01, 0x01],
        'U' => [0x3F, 0x40, 0x40, 0x40, 0x3F],
        'V' => [0x1F, 0x20, 0x40, 0x20, 0x1F],
        'W' => [0x3F, 0x40, 0x38, 0x40, 0x3F],
        'X' => [0x63, 0x14, 0x08, 0x14, 0x63],
        'Y' => [0x07, 0x08, 0x70, 0x08, 0x07],
        'Z' => [0x61, 0x51, 0x49, 0x45, 0x43],
        '0' => [0x3E, 0x51, 0x49, 0x45, 0x3E],
        '1' => [0x00, 0x42, 0x7F, 0x40, 0x00],
        '2' => [0x42, 0x61, 0x51, 0x49, 0x46],
        '3' => [0x21, 0x41, 0x45, 0x4B, 0x31],
        '4' => [0x18, 0x14, 0x12, 0x7F, 0x10],
        '5' => [0x27, 0x45, 0x45, 0x45, 0x39],
        '6' => [0x3C, 0x4A, 0x49, 0x49, 0x30],
        '7' => [0x01, 0x71, 0x09, 0x05, 0x03],
        '8' => [0x36, 0x49, 0x49, 0x49, 0x36],
        '9' => [0x06, 0x49, 0x49, 0x29, 0x1E],
        '-' => [0x08, 0x08, 0x08, 0x08, 0x08],
        '.' => [0x00, 0x60, 0x60, 0x00, 0x00],
        '!' => [0x00, 0x00, 0x5F, 0x00, 0x00],
        '&' => [0x36, 0x49, 0x55, 0x22, 0x50],
        '\'' => [0x00, 0x05, 0x03, 0x00, 0x00],
        '…' => [0x40, 0x00, 0x40, 0x00, 0x40],
        _ => return None,
    };
    Some(columns)
}
