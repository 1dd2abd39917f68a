// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! File stem derivation for generated job files.
//!
//! Stems produced by this module contain only lowercase ASCII alphanumeric
//! characters separated by single hyphens, so `Universal`, `Win`, and `DX11`
//! become `universal-win-dx11`.

/// Builder for file stems assembled from one or more configuration names.
#[derive(Debug, Clone, Copy,)]
pub struct FileStem<'input,>
{
    parts: &'input [&'input str],
}

impl<'input,> FileStem<'input,>
{
    /// Creates a stem builder over the provided name components.
    pub fn builder(parts: &'input [&'input str],) -> Self
    {
        Self {
            parts,
        }
    }

    /// Builds the stem by slugging each component and joining them with a
    /// hyphen. Returns `None` when there are no components or when any
    /// component has no slug-worthy characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipegen::FileStem;
    ///
    /// let stem = FileStem::builder(&["Universal", "Win", "DX11",],).build();
    /// assert_eq!(stem.as_deref(), Some("universal-win-dx11"));
    /// ```
    pub fn build(self,) -> Option<String,>
    {
        if self.parts.is_empty() {
            return None;
        }

        let mut stem = String::new();
        for part in self.parts {
            let slug = slug_component(part,)?;
            if !stem.is_empty() {
                stem.push('-',);
            }
            stem.push_str(&slug,);
        }

        Some(stem,)
    }
}

fn slug_component(source: &str,) -> Option<String,>
{
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut slug = String::with_capacity(trimmed.len(),);
    let mut previous_hyphen = false;

    for candidate in trimmed.chars() {
        match candidate {
            'A'..='Z' => {
                slug.push(candidate.to_ascii_lowercase(),);
                previous_hyphen = false;
            }
            'a'..='z' | '0'..='9' => {
                slug.push(candidate,);
                previous_hyphen = false;
            }
            _ => {
                if !previous_hyphen && !slug.is_empty() {
                    slug.push('-',);
                    previous_hyphen = true;
                }
            }
        }
    }

    while slug.ends_with('-',) {
        slug.pop();
    }

    if slug.is_empty() { None } else { Some(slug,) }
}
