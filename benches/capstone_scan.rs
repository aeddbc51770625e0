use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qr_capstone::{ScanConfig, ScanContext};

/// Light image with a grid of capstones drawn at `module` pixels per module
fn capstone_field(width: usize, height: usize, module: usize) -> Vec<u8> {
    let mut gray = vec![220u8; width * height];
    let step = module * 10;
    for oy in (module..height.saturating_sub(step)).step_by(step) {
        for ox in (module..width.saturating_sub(step)).step_by(step) {
            for my in 0..7 {
                for mx in 0..7 {
                    let ring = mx == 0 || mx == 6 || my == 0 || my == 6;
                    let stone = (2..=4).contains(&mx) && (2..=4).contains(&my);
                    if !(ring || stone) {
                        continue;
                    }
                    for dy in 0..module {
                        let row = (oy + my * module + dy) * width;
                        for dx in 0..module {
                            gray[row + ox + mx * module + dx] = 30;
                        }
                    }
                }
            }
        }
    }
    gray
}

fn bench_identify(c: &mut Criterion, name: &str, parallel: bool) {
    let (width, height) = (640, 480);
    let gray = capstone_field(width, height, 4);
    let config = ScanConfig::default().with_parallel_rows(parallel);
    let mut ctx = ScanContext::new(width, height, config).unwrap();
    c.bench_function(name, |b| {
        b.iter(|| ctx.identify(black_box(&gray)).map(|caps| caps.len()))
    });
}

fn bench_identify_parallel(c: &mut Criterion) {
    bench_identify(c, "identify_640x480_parallel", true);
}

fn bench_identify_sequential(c: &mut Criterion) {
    bench_identify(c, "identify_640x480_sequential", false);
}

criterion_group!(benches, bench_identify_parallel, bench_identify_sequential);
criterion_main!(benches);
