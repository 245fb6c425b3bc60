//! Fetching, scaling and encoding images for display in the terminal.
use std::fs;
use std::io;
use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use ::image::DynamicImage;
use ::image::ImageFormat;
use ::image::Rgba;
use ::image::imageops::FilterType;
use mdkit_core::kitty;
use url::Url;

use super::ImageEncoderKind;
use super::RendererOptions;
use super::writer::LineWriter;
use crate::error::ImageError;

/// Cell width assumed when the terminal does not report its pixel size.
const FALLBACK_CELL_WIDTH: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Remote(Url),
}

/// An encoded image ready to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageFrame {
    /// Kitty graphics commands. They occupy no columns of their own.
    Kitty(String),
    /// One string of half-block cells per terminal row.
    Cells(Vec<String>),
}

impl ImageFrame {
    pub(crate) fn write_to<W: Write>(&self, writer: &mut LineWriter<W>) -> io::Result<()> {
        match self {
            ImageFrame::Kitty(commands) => writer.write_raw(commands),
            ImageFrame::Cells(rows) => {
                writer.push_wrap(false);
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        writer.write_str("\n")?;
                    }
                    writer.write_str(row)?;
                }
                writer.pop_wrap();
                Ok(())
            }
        }
    }
}

/// Resolves an image location.
///
/// Absolute URLs keep their scheme. Anything else is a path joined onto `content_root`, and a
/// path that is still relative after the join is taken relative to the working directory.
pub fn resolve_location(location: &str, content_root: &Path) -> Result<ImageSource, ImageError> {
    match Url::parse(location) {
        Ok(url) => match url.scheme() {
            "file" => url
                .to_file_path()
                .map(ImageSource::File)
                .map_err(|()| ImageError::InvalidPath(location.to_owned())),
            "http" | "https" => Ok(ImageSource::Remote(url)),
            other => Err(ImageError::UnsupportedScheme(other.to_owned())),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path = content_root.join(location);
            if path.is_absolute() {
                Ok(ImageSource::File(path))
            } else {
                Ok(ImageSource::File(Path::new(".").join(path)))
            }
        }
        Err(err) => Err(err.into()),
    }
}

pub fn fetch(source: &ImageSource) -> Result<Vec<u8>, ImageError> {
    match source {
        ImageSource::File(path) => Ok(fs::read(path)?),
        ImageSource::Remote(url) => {
            let response = ureq::get(url.as_str()).call()?;
            Ok(response.into_body().read_to_vec()?)
        }
    }
}

/// Loads the image at `location` and encodes it for the configured encoder.
pub fn render_image(options: &RendererOptions, location: &str) -> Result<ImageFrame, ImageError> {
    let source = resolve_location(location, &options.images.content_root)?;
    let bytes = fetch(&source)?;
    let img = ::image::load_from_memory(&bytes)?;
    let columns = u32::try_from(options.images.max_width)
        .unwrap_or(u32::MAX)
        .max(1);
    match options.images.encoder {
        ImageEncoderKind::Kitty => {
            let cell = options
                .geometry
                .cell_size()
                .map_or(FALLBACK_CELL_WIDTH, |(w, _)| w.max(1));
            kitty_frame(&img, columns.saturating_mul(cell))
        }
        ImageEncoderKind::HalfBlock => Ok(half_block_frame(&img, columns)),
    }
}

/// Shrinks `img` to at most `max_width` pixels wide, keeping its aspect ratio. Never enlarges.
fn downscale(img: &DynamicImage, max_width: u32) -> DynamicImage {
    if img.width() <= max_width {
        return img.clone();
    }
    img.resize(max_width, img.height(), FilterType::CatmullRom)
}

fn kitty_frame(img: &DynamicImage, max_width: u32) -> Result<ImageFrame, ImageError> {
    let img = downscale(img, max_width);
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(ImageFrame::Kitty(kitty::encode_to_string(&png)))
}

/// Draws two pixel rows per terminal row: the upper pixel as the foreground of `▀`, the lower
/// one as its background.
fn half_block_frame(img: &DynamicImage, columns: u32) -> ImageFrame {
    let rgba = downscale(img, columns).to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rows = Vec::with_capacity(height.div_ceil(2) as usize);
    for y in (0..height).step_by(2) {
        let mut row = String::new();
        for x in 0..width {
            push_colour(&mut row, 38, Some(rgba.get_pixel(x, y)));
            push_colour(&mut row, 48, (y + 1 < height).then(|| rgba.get_pixel(x, y + 1)));
            row.push('▀');
        }
        row.push_str("\x1b[0m");
        rows.push(row);
    }
    ImageFrame::Cells(rows)
}

/// Mostly transparent pixels use the terminal's default colour.
fn push_colour(out: &mut String, command: u8, pixel: Option<&Rgba<u8>>) {
    match pixel {
        Some(p) if p[3] >= 128 => {
            out.push_str(&format!("\x1b[{command};2;{};{};{}m", p[0], p[1], p[2]));
        }
        _ => out.push_str(&format!("\x1b[{}m", command + 1)),
    }
}
