//! Fixtures shared by the unit and HTTP tests.

use axum_test::TestServer;
use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, Write};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::config::Config;

pub fn create_test_app() -> TestServer {
    create_test_app_with_config(Config::default())
}

pub fn create_test_app_with_config(config: Config) -> TestServer {
    crate::Application::new(config).into_test_server()
}

fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut out, format)
        .expect("Failed to encode test image");
    out.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(width, height, ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(width, height, ImageFormat::Jpeg)
}

pub fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(width, height, ImageFormat::Gif)
}

fn file_options(stored: bool) -> SimpleFileOptions {
    if stored {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    } else {
        SimpleFileOptions::default()
    }
}

fn build_zip(directory: Option<&str>, entries: &[(&str, &[u8])], stored: bool) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    if let Some(directory) = directory {
        writer.add_directory(directory, file_options(stored)).unwrap();
    }

    for (name, data) in entries {
        writer.start_file(*name, file_options(stored)).unwrap();
        writer.write_all(data).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// Deflate-compressed archive with the entries in the given order
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_zip(None, entries, false)
}

/// Uncompressed archive, so entry data appears verbatim in the output
pub fn stored_zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_zip(None, entries, true)
}

/// Archive whose first entry is the directory `directory`
pub fn zip_with_directory(directory: &str, entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_zip(Some(directory), entries, false)
}
