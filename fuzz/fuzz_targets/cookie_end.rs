#![no_main]

use clickpath_access_log::micro::cookie;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, usize)| {
    let (line, start) = input;

    // 임의 시작 위치에서도 패닉 없이 끝을 찾거나 폴트를 반환해야 한다
    if line.is_char_boundary(start.min(line.len())) {
        let _ = cookie::identify_end(&line, start);
    }
});
