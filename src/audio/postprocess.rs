//! Tail trimming so the sweep ends near a zero crossing
//!
//! Stopping a sine at an arbitrary phase drops the speaker from a non-zero
//! level to silence in one sample, which clicks. The tail is cut back to the
//! end of a negative half-wave and closed with an explicit zero.

/// Trim the end of `buffer` to a rising zero crossing and append a `0`.
///
/// An empty buffer is left untouched.
pub fn trim_tail(buffer: &mut Vec<f32>) {
    let Some(&last) = buffer.last() else {
        return;
    };

    if last > 0.0 {
        // Keep everything up to the last negative sample; with none, keep all
        if let Some(index) = buffer.iter().rposition(|&s| s < 0.0) {
            buffer.truncate(index + 1);
        }
    } else if let Some(index) = buffer.windows(2).rposition(|w| w[0] < 0.0 && w[1] > 0.0) {
        buffer.truncate(index + 1);
    }

    buffer.push(0.0);
}
