//! Token descrambler
//!
//! The authentication endpoint issues tokens with five extra characters
//! spliced in. The oracle converts the session salts into the positions of
//! those characters; excising them yields the usable bearer token. The
//! access and refresh tokens use different salt permutations, ten oracle
//! calls in total.

use tracing::debug;

use crate::error::Result;
use crate::oracle::{OracleEntry, SaltOracle};
use crate::types::{DescrambledCredential, RawTokenResponse, SaltQuintuple};

/// Reverses the exchange's token scrambling with oracle-computed indices.
#[derive(Debug)]
pub struct TokenDescrambler<O: SaltOracle> {
    oracle: O,
}

impl<O: SaltOracle> TokenDescrambler<O> {
    /// Create a descrambler over the given oracle
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Descramble both tokens of an authentication response.
    pub fn descramble(&self, raw: &RawTokenResponse) -> Result<DescrambledCredential> {
        let salts = raw.salts();
        let access_cuts = self.access_cut_indices(salts)?;
        let refresh_cuts = self.refresh_cut_indices(salts)?;
        debug!(?access_cuts, ?refresh_cuts, "computed token cut indices");

        Ok(DescrambledCredential::new(
            excise(&raw.access_token, access_cuts),
            excise(&raw.refresh_token, refresh_cuts),
            salts,
        ))
    }

    /// First oracle pass, for the access token.
    ///
    /// The argument permutations are load-bearing: the oracle is sensitive
    /// to argument order, and a wrong permutation yields plausible-looking
    /// but wrong indices rather than an error.
    fn access_cut_indices(&self, s: SaltQuintuple) -> Result<[i32; 5]> {
        let SaltQuintuple {
            salt1: s1,
            salt2: s2,
            salt3: s3,
            salt4: s4,
            salt5: s5,
        } = s;

        Ok([
            self.oracle.cut_index(OracleEntry::Cdx, [s1, s2, s3, s4, s5])?,
            self.oracle.cut_index(OracleEntry::Rdx, [s1, s2, s4, s3, s5])?,
            self.oracle.cut_index(OracleEntry::Bdx, [s1, s2, s4, s3, s5])?,
            self.oracle.cut_index(OracleEntry::Ndx, [s1, s2, s4, s3, s5])?,
            self.oracle.cut_index(OracleEntry::Mdx, [s1, s2, s4, s3, s5])?,
        ])
    }

    /// Second oracle pass, for the refresh token: salts 1 and 2 swap, and
    /// the first entry point additionally swaps the last two arguments.
    fn refresh_cut_indices(&self, s: SaltQuintuple) -> Result<[i32; 5]> {
        let SaltQuintuple {
            salt1: s1,
            salt2: s2,
            salt3: s3,
            salt4: s4,
            salt5: s5,
        } = s;

        Ok([
            self.oracle.cut_index(OracleEntry::Cdx, [s2, s1, s3, s5, s4])?,
            self.oracle.cut_index(OracleEntry::Rdx, [s2, s1, s3, s4, s5])?,
            self.oracle.cut_index(OracleEntry::Bdx, [s2, s1, s4, s3, s5])?,
            self.oracle.cut_index(OracleEntry::Ndx, [s2, s1, s4, s3, s5])?,
            self.oracle.cut_index(OracleEntry::Mdx, [s2, s1, s4, s3, s5])?,
        ])
    }
}

/// Remove the characters at the five cut positions.
///
/// For cuts `a,b,c,d,e` the result is
/// `S[0:a] + S[a+1:b] + S[b+1:c] + S[c+1:d] + S[d+1:e] + S[e+1:]` with
/// Python slice semantics: a start at or past its end collapses the segment
/// to empty, indices beyond the string clamp to its length, and negative
/// indices count from the end. No index values can make this fail; a
/// mis-ordered oracle response silently yields a shorter string, matching
/// the upstream behavior. Positions are in characters, not bytes.
fn excise(scrambled: &str, cuts: [i32; 5]) -> String {
    let chars: Vec<char> = scrambled.chars().collect();
    let len = chars.len();
    let [a, b, c, d, e] = cuts.map(i64::from);

    let spans = [
        (0, a),
        (a + 1, b),
        (b + 1, c),
        (c + 1, d),
        (d + 1, e),
        (e + 1, len as i64),
    ];

    let mut out = String::with_capacity(scrambled.len());
    for (start, end) in spans {
        let start = resolve(start, len);
        let end = resolve(end, len);
        if start < end {
            out.extend(&chars[start..end]);
        }
    }
    out
}

/// Resolve a possibly negative or oversized slice bound into `0..=len`.
fn resolve(index: i64, len: usize) -> usize {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    resolved.clamp(0, len) as usize
}
