#![no_main]
use libfuzzer_sys::fuzz_target;

use gzsplice::GzipStreamWriter;

// Drive the writer with an arbitrary operation sequence decoded from the
// fuzz input. Whatever the sequence, the writer must not panic, and a
// successful close must leave a member whose trailer ISIZE matches the
// content length the operations implied.
fuzz_target!(|data: &[u8]| {
    let mut z = GzipStreamWriter::new(Vec::new());
    let mut expected_len = 0u32;
    let mut errored = false;
    let mut closed = false;

    let mut input = data;
    while let Some((&op, rest)) = input.split_first() {
        input = rest;
        match op % 4 {
            0 => {
                // Raw write: take up to 255 bytes from the input.
                let take = (*input.first().unwrap_or(&0) as usize).min(input.len());
                let (chunk, rest) = input.split_at(take);
                input = rest;
                match z.write_raw(chunk) {
                    Ok(n) => expected_len = expected_len.wrapping_add(n as u32),
                    Err(_) => errored = true,
                }
            }
            1 => {
                // Splice attempt: feed the remaining input as a blob.
                // Almost always invalid — exercises the latch path.
                let parsed_isize = gzsplice::parse_blob(input).ok().map(|p| p.isize);
                match z.write_compressed(input) {
                    Ok(_) => {
                        if !closed {
                            if let Some(isize) = parsed_isize {
                                expected_len = expected_len.wrapping_add(isize);
                            }
                        }
                    }
                    Err(_) => errored = true,
                }
            }
            2 => {
                if z.flush().is_err() {
                    errored = true;
                }
            }
            _ => match z.close() {
                Ok(()) => closed = true,
                Err(_) => errored = true,
            },
        }
    }

    if !errored {
        if z.close().is_ok() {
            let out = z.reset(Vec::new());
            if out.len() >= 18 {
                let n = out.len();
                let isize = u32::from_le_bytes([out[n - 4], out[n - 3], out[n - 2], out[n - 1]]);
                assert_eq!(isize, expected_len);
            }
        }
    }
});
