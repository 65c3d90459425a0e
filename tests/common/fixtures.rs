use fontfall_core::testing::TestFont;

/// Regular face on a 2048 em square, Arial-like vertical metrics.
pub fn regular_2048() -> Vec<u8> {
    TestFont::new("Fixture Sans").build()
}

/// Bold face with a different em square, so picking it would change the output.
pub fn bold_1000() -> Vec<u8> {
    TestFont::new("Fixture Sans")
        .with_units_per_em(1000)
        .with_metrics(950, -250, 0)
        .build()
}

/// A serif face on a 1000-unit em square.
pub fn serif_1000() -> Vec<u8> {
    TestFont::new("Fixture Serif")
        .with_units_per_em(1000)
        .with_metrics(800, -200, 0)
        .build()
}

/// [`regular_2048`] in a WOFF2 container.
pub fn regular_2048_woff2() -> Vec<u8> {
    TestFont::new("Fixture Sans").build_woff2()
}

/// [`bold_1000`] in a WOFF container.
pub fn bold_1000_woff() -> Vec<u8> {
    TestFont::new("Fixture Sans")
        .with_units_per_em(1000)
        .with_metrics(950, -250, 0)
        .build_woff()
}
