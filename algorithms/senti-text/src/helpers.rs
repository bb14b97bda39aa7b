/// Given a sequence of tokens, the list can be iterated to obtain all the n-grams in the sequence,
/// starting from n-grams of length `min` up to n-grams of length `max`. Tokens of an n-gram are
/// joined with the separator, a single space by default. Character n-grams use an empty
/// separator.
pub struct NGramList<T: ToString> {
    min: usize,
    max: usize,
    separator: String,
    list: Vec<T>,
}

pub struct NGramListIntoIterator<T: ToString> {
    list: NGramList<T>,
    index: usize,
}

impl<T: ToString> Iterator for NGramListIntoIterator<T> {
    type Item = Vec<String>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.list.len() {
            return None;
        }
        let res = self.list.ngram_items(self.index);
        if res.is_some() {
            self.index += 1;
            res
        } else {
            None
        }
    }
}

impl<T: ToString> IntoIterator for NGramList<T> {
    type Item = Vec<String>;
    type IntoIter = NGramListIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        NGramListIntoIterator {
            list: self,
            index: 0,
        }
    }
}

impl<T: ToString> NGramList<T> {
    pub fn new(vec: Vec<T>, range: (usize, usize)) -> Self {
        Self {
            min: range.0,
            max: range.1,
            separator: " ".to_string(),
            list: vec,
        }
    }

    /// Join the tokens of an n-gram with `separator`
    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Constructs all n-grams obtainable from the token sequence starting from the token at `index`
    pub fn ngram_items(&self, index: usize) -> Option<Vec<String>> {
        let mut items = Vec::new();
        let len = self.list.len();
        let min_end = index + self.min;
        if min_end > len {
            return None;
        }
        let max_end = (index + self.max).min(len);

        let mut item = self.list[index].to_string();
        for j in (index + 1)..min_end {
            item.push_str(&self.separator);
            item.push_str(&self.list[j].to_string());
        }
        items.push(item.clone());
        for j in min_end..max_end {
            item.push_str(&self.separator);
            item.push_str(&self.list[j].to_string());
            items.push(item.clone())
        }
        Some(items)
    }
}

#[cfg(test)]
#[macro_export]
macro_rules! column_for_word {
    ($voc:expr, $transf:expr, $word: expr ) => {
        $transf.column($voc.iter().position(|s| *s == $word.to_string()).unwrap())
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ngram_list() {
        let words = vec![
            "oNe",
            "oNe",
            "two",
            "three",
            "four",
            "TWO",
            "three",
            "four",
            "three;four",
            "four",
        ];
        let list = NGramList::new(words.clone(), (1, 1));
        for (i, items) in list.into_iter().enumerate() {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0], words[i].clone());
        }

        let list = NGramList::new(words.clone(), (2, 2));
        for (i, items) in list.into_iter().enumerate() {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0], words[i].to_string() + " " + words[i + 1]);
        }
        let list = NGramList::new(words.clone(), (1, 2));
        for (i, items) in list.into_iter().enumerate() {
            if i < words.len() - 1 {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0], words[i]);
                assert_eq!(items[1], words[i].to_string() + " " + words[i + 1]);
            } else {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0], words[i]);
            }
        }
    }

    #[test]
    fn character_trigrams() {
        let chars = "\u{2}ab c\u{3}".chars().collect::<Vec<_>>();
        let grams = NGramList::new(chars, (3, 3))
            .separator("")
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        assert_eq!(grams, vec!["\u{2}ab", "ab ", "b c", " c\u{3}"]);
    }

    #[test]
    fn short_sequences_have_no_long_grams() {
        let list = NGramList::new(vec!["single"], (2, 3));
        assert_eq!(list.into_iter().count(), 0);

        let list: NGramList<&str> = NGramList::new(vec![], (1, 1));
        assert!(list.is_empty());
        assert_eq!(list.into_iter().count(), 0);
    }
}
