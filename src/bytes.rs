//! Small byte-buffer helpers, mostly useful for test fixtures and benchmarks.

/// Overwrite every byte with zero.
pub fn zero_bytes(buf: &mut [u8]) {
    buf.fill(0);
}

/// Write an incrementing pattern: byte `i` becomes `i mod 256`.
pub fn fill_bytes(buf: &mut [u8]) {
    for (i, b) in buf.iter_mut().enumerate() {
        *b = i as u8;
    }
}

/// Count positions where `a` and `b` differ, over the shorter of the two.
pub fn diff_bytes(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_clears_powers_of_two() {
        let mut size = 1;
        while size < 1 << 20 {
            let mut buf = vec![0xAAu8; size];
            zero_bytes(&mut buf);
            assert_eq!(diff_bytes(&buf, &vec![0u8; size]), 0, "size {size}");
            size <<= 1;
        }
    }

    #[test]
    fn fill_wraps_every_256() {
        let mut buf = vec![0u8; 1000];
        fill_bytes(&mut buf);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[255], 255);
        assert_eq!(buf[256], 0);
        assert_eq!(buf[999], (999 % 256) as u8);
    }

    #[test]
    fn diff_counts_mismatches_over_shorter_slice() {
        let mut a = vec![0u8; 16];
        fill_bytes(&mut a);
        let mut b = a.clone();
        b[3] = 0xFF;
        b[9] = 0xFF;
        assert_eq!(diff_bytes(&a, &b), 2);
        assert_eq!(diff_bytes(&a[..4], &b), 1);
        assert_eq!(diff_bytes(&[], &b), 0);
    }
}
