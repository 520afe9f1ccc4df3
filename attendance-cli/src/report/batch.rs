//! Batching Engine: split a course's participants into sheets of ten

use std::collections::HashSet;

use super::records::Participant;

/// Rows on one attendance sheet
pub const BATCH_SIZE: usize = 10;

/// Participants rendered on one document
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// 1-based, feeds the output filename
    pub index: usize,
    pub participants: Vec<Participant>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// Drop repeated (RPE, name) pairs, keeping the first occurrence
pub fn dedup_participants(participants: &[Participant]) -> Vec<Participant> {
    let mut seen = HashSet::new();
    participants
        .iter()
        .filter(|p| seen.insert(p.key()))
        .cloned()
        .collect()
}

/// Deduplicate and split into consecutive batches.
///
/// An empty list still yields one empty batch so the course gets a blank
/// sheet.
pub fn plan_batches(participants: &[Participant]) -> Vec<Batch> {
    let unique = dedup_participants(participants);

    if unique.is_empty() {
        return vec![Batch {
            index: 1,
            participants: Vec::new(),
        }];
    }

    unique
        .chunks(BATCH_SIZE)
        .enumerate()
        .map(|(i, chunk)| Batch {
            index: i + 1,
            participants: chunk.to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::records::SexMarker;

    fn people(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|i| Participant::new(format!("R{:03}", i), format!("Persona {}", i), SexMarker::Male))
            .collect()
    }

    #[test]
    fn test_duplicates_collapse() {
        let list = vec![
            Participant::new("R1", "Ana", SexMarker::Female),
            Participant::new("R1", "Ana", SexMarker::Unknown),
            Participant::new("R1", "Ana Maria", SexMarker::Female),
            Participant::new("R2", "Ana", SexMarker::Female),
        ];
        let unique = dedup_participants(&list);

        assert_eq!(unique.len(), 3);
        // first occurrence wins, including its sex marker
        assert_eq!(unique[0].sex, SexMarker::Female);
        assert_eq!(unique[1].full_name, "Ana Maria");
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let mut list = people(12);
        list.extend(people(5));
        let once = dedup_participants(&list);
        assert_eq!(dedup_participants(&once), once);
    }

    #[test]
    fn test_fifteen_make_two_batches() {
        let batches = plan_batches(&people(15));
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].index, 1);
        assert_eq!(batches[0].participants.len(), 10);
        assert_eq!(batches[1].index, 2);
        assert_eq!(batches[1].participants.len(), 5);
        assert_eq!(batches[1].participants[0].rpe, "R010");
    }

    #[test]
    fn test_empty_yields_one_blank_batch() {
        let batches = plan_batches(&[]);
        assert_eq!(batches.len(), 1);
        assert!(batches[0].is_empty());
    }

    #[test]
    fn test_batch_count_is_ceiling() {
        for n in [1, 9, 10, 11, 20, 21, 35] {
            assert_eq!(plan_batches(&people(n)).len(), n.div_ceil(BATCH_SIZE), "n = {}", n);
        }
    }
}
