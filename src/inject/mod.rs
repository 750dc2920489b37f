//! Replacer scaffold injection
//!
//! Once the boundary constants and the decoder function live in the
//! target file, a fixed scaffold does the actual rewriting: it collects
//! every `name(0xNN)` call site whose argument falls inside
//! `[startHex, endHex]`, runs each through the decoder, and replaces the
//! call with the quoted decoded string. The scaffold is static JS text
//! with a single substitution slot for the decoder's name.

/// Placeholder in [`REPLACER_BOILERPLATE`] receiving the decoder name.
pub const DECODER_SLOT: &str = "__DECODER__";

/// Decoder name used when the caller does not supply one.
pub const DEFAULT_DECODER: &str = "decodeString";

const REPLACER_BOILERPLATE: &str = r#"import fs from "fs";

function findExtendedHexInRange(filePath, startRange, endRange) {
    const pattern = /([\w]*\(0x[0-9a-fA-F]+\))/g;
    const matches = [];

    const data = fs.readFileSync(filePath, "utf8");
    const lines = data.split("\n");
    lines.forEach((line) => {
        const found = line.match(pattern);
        if (found) {
            found.forEach((match) => {
                const hexMatch = match.match(/\(0x[0-9a-fA-F]+\)/)[0];
                const hexValue = parseInt(hexMatch.slice(3, -1), 16);
                if (hexValue >= startRange && hexValue <= endRange) {
                    matches.push({ fullMatch: match, hexValue: hexMatch.slice(1, -1) });
                }
            });
        }
    });

    return matches;
}

function replaceMatchesInFile(filePath, matches, processedResults) {
    let data = fs.readFileSync(filePath, "utf8");

    matches.forEach((match, index) => {
        const cleanedResult = processedResults[index].replace(/\n/g, "");
        const quotedResult = `'${cleanedResult}'`;
        data = data.replace(match, quotedResult);
    });

    fs.writeFileSync(filePath, data, "utf8");
    console.log("File updated successfully.");
}

if (process.argv.length < 3) {
    console.error("Usage: node replacer.js <filePath>");
    process.exit(1);
}

const filePath = process.argv[2];

const results = findExtendedHexInRange(filePath, startHex, endHex);
console.log("Matching instances:");
console.log(results.map((result) => result.fullMatch));

const processedResults = results.map((result) => __DECODER__(result.hexValue));
console.log("Processed results:");
console.log(processedResults);

replaceMatchesInFile(
    filePath,
    results.map((result) => result.fullMatch),
    processedResults
);
"#;

/// The scaffold with the decoder slot filled in.
pub fn replacer_boilerplate(decoder: &str) -> String {
    REPLACER_BOILERPLATE.replace(DECODER_SLOT, decoder)
}

// ─── Tests ──────────────────────────────────────────────────────────
