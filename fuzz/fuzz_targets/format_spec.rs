#![no_main]

use clickpath_access_log::format::LogFormat;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(spec) = std::str::from_utf8(data) {
        // 임의 포맷 명세 컴파일은 패닉 없이 실패해야 한다
        let _ = LogFormat::from_spec(spec);
    }
});
