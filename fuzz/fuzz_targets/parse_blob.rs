#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes through the blob parser: Err is expected and fine;
    // what we verify is no panics and that accepted payloads stay in bounds.
    if let Ok(parts) = gzsplice::parse_blob(data) {
        assert!(parts.deflate.len() <= data.len().saturating_sub(18));

        // The payload must alias the input buffer.
        let base = data.as_ptr() as usize;
        let payload = parts.deflate.as_ptr() as usize;
        assert!(payload >= base && payload + parts.deflate.len() <= base + data.len());

        // The trailer fields come from the final 8 bytes, little-endian.
        let n = data.len();
        assert_eq!(
            parts.crc,
            u32::from_le_bytes([data[n - 8], data[n - 7], data[n - 6], data[n - 5]])
        );
        assert_eq!(
            parts.isize,
            u32::from_le_bytes([data[n - 4], data[n - 3], data[n - 2], data[n - 1]])
        );
    }
});
