#![no_main]

use clickpath_access_log::format::LogFormat;
use clickpath_access_log::parser::LineParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        let parser = LineParser::new(LogFormat::common());

        // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
        let _ = parser.parse(line);

        let parser = LineParser::new(LogFormat::performance_analysis());
        let _ = parser.parse(line);
    }
});
