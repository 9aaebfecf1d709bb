use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use shoji_ansi::AnsiDecoder;
use shoji_core::{ScreenBuffer, SharedScreen};

fn generate_plain_text(size: usize) -> Vec<u8> {
    let text = "The quick brown fox jumps over the lazy dog. ";
    text.as_bytes().iter().cycle().take(size).copied().collect()
}

fn generate_colored_text(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let colors = [
        "\x1b[31m", "\x1b[32m", "\x1b[33m", "\x1b[34m", "\x1b[1;35m", "\x1b[0m",
    ];
    let text = "Colored text ";

    let mut i = 0;
    while data.len() < size {
        data.extend_from_slice(colors[i % colors.len()].as_bytes());
        data.extend_from_slice(text.as_bytes());
        i += 1;
    }
    data.truncate(size);
    data
}

fn generate_cursor_movement(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let sequences = [
        "\x1b[A", "\x1b[B", "\x1b[C", "\x1b[D", "\x1b[10;20H", "\x1b[K", "\x1b[2J",
    ];

    let mut i = 0;
    while data.len() < size {
        data.extend_from_slice(sequences[i % sequences.len()].as_bytes());
        i += 1;
    }
    data.truncate(size);
    data
}

fn fresh_screen() -> SharedScreen {
    SharedScreen::new(ScreenBuffer::new(80, 25, 200))
}

fn bench_decoder_throughput(c: &mut Criterion) {
    let sizes = [1024, 10 * 1024, 100 * 1024];

    let mut group = c.benchmark_group("decoder_throughput");

    for size in sizes {
        let plain_text = generate_plain_text(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("plain_text_{size}"), |b| {
            b.iter(|| {
                let mut screen = fresh_screen();
                let mut decoder = AnsiDecoder::new();
                decoder.feed(black_box(&plain_text), &mut screen);
            });
        });

        let colored_text = generate_colored_text(size);
        group.bench_function(format!("colored_text_{size}"), |b| {
            b.iter(|| {
                let mut screen = fresh_screen();
                let mut decoder = AnsiDecoder::new();
                decoder.feed(black_box(&colored_text), &mut screen);
            });
        });

        let cursor_movement = generate_cursor_movement(size);
        group.bench_function(format!("cursor_movement_{size}"), |b| {
            b.iter(|| {
                let mut screen = fresh_screen();
                let mut decoder = AnsiDecoder::new();
                decoder.feed(black_box(&cursor_movement), &mut screen);
            });
        });
    }

    group.finish();
}

fn bench_chunk_boundaries(c: &mut Criterion) {
    let data = generate_colored_text(10 * 1024);
    let chunk_sizes = [1, 8, 64, 512, 1024];

    let mut group = c.benchmark_group("chunk_boundaries");

    for chunk_size in chunk_sizes {
        group.bench_function(format!("chunk_{chunk_size}"), |b| {
            b.iter(|| {
                let mut screen = fresh_screen();
                let mut decoder = AnsiDecoder::new();
                for chunk in data.chunks(chunk_size) {
                    decoder.feed(black_box(chunk), &mut screen);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decoder_throughput, bench_chunk_boundaries);
criterion_main!(benches);
