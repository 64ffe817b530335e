/// Lattice work space for first-order Viterbi decoding.
///
/// All scores are in the logarithm domain. Buffers grow to the longest
/// sentence seen and are reused afterwards.
#[derive(Debug, Default)]
pub(crate) struct HmmContext {
    /// The total number of distinct labels (L).
    pub num_labels: usize,

    /// The number of items (T) in the current sequence.
    num_items: usize,

    /// Number of items the [T][L] buffers can currently hold.
    cap_items: usize,

    /// Initial scores.
    /// This is a [L] vector whose element [l] is the score of starting the
    /// sequence with label #l.
    pub init: Vec<f64>,

    /// State (emission) scores.
    /// This is a [T][L] matrix whose element [t][l] is the score of label #l
    /// emitting the item at #t.
    pub state: Vec<f64>,

    /// Transition scores.
    /// This is a [L][L] matrix whose element [i][j] is the score of label #j
    /// following label #i.
    pub trans: Vec<f64>,

    /// Best path scores.
    /// This is a [T][L] matrix whose element [t][l] is the score of the best
    /// path arriving at (t, l).
    alpha_score: Vec<f64>,

    /// Backward edges.
    /// This is a [T][L] matrix whose element [t][j] is the label #i at t-1
    /// on the best path arriving at (t, j).
    backward_edge: Vec<Option<usize>>,
}

impl HmmContext {
    pub fn new(num_labels: usize, num_items: usize) -> Self {
        let mut this = Self::default();
        this.set_num_labels(num_labels);
        this.set_num_items(num_items);
        this
    }

    pub fn set_num_labels(&mut self, num_labels: usize) {
        if self.num_labels != num_labels {
            self.num_labels = num_labels;
            /* Force the [T][L] buffers to be resized. */
            self.cap_items = 0;
        }
        let l = num_labels;
        self.init.clear();
        self.init.resize(l, 0.0);
        self.trans.clear();
        self.trans.resize(l * l, 0.0);
    }

    pub fn set_num_items(&mut self, num_items: usize) {
        let l = self.num_labels;
        self.num_items = num_items;
        if self.cap_items < num_items {
            self.state.resize(num_items * l, 0.0);
            self.alpha_score.resize(num_items * l, 0.0);
            self.backward_edge.resize(num_items * l, None);
            self.cap_items = num_items;
        }
        self.state[..num_items * l].fill(0.0);
        self.alpha_score[..num_items * l].fill(f64::NEG_INFINITY);
        self.backward_edge[..num_items * l].fill(None);
    }

    /// Find the best label path. Returns the label ids and the path score,
    /// or `None` when some step has no finite predecessor.
    ///
    /// Ties go to the lowest label id.
    pub fn viterbi(&mut self) -> Option<(Vec<usize>, f64)> {
        let t_len = self.num_items;
        let l = self.num_labels;
        if t_len == 0 || l == 0 {
            return None;
        }

        /* Compute the scores at (0, *). */
        for j in 0..l {
            self.alpha_score[j] = self.init[j] + self.state[j];
        }

        /* Compute the scores at (t, *). */
        for t in 1..t_len {
            for j in 0..l {
                let mut max_score = f64::NEG_INFINITY;
                let mut argmax = None;
                for i in 0..l {
                    /* Transit from (t-1, i) to (t, j), emitting item #t. */
                    let score = self.alpha_score[l * (t - 1) + i] + self.trans[l * i + j] + self.state[l * t + j];
                    if score > max_score {
                        max_score = score;
                        argmax = Some(i);
                    }
                }
                self.backward_edge[l * t + j] = argmax;
                self.alpha_score[l * t + j] = max_score;
            }
        }

        /* Find the node (#T-1, #i) with the maximum score. */
        let last = l * (t_len - 1);
        let mut best = 0;
        for i in 1..l {
            if self.alpha_score[last + i] > self.alpha_score[last + best] {
                best = i;
            }
        }
        let max_score = self.alpha_score[last + best];

        /* Tag labels by tracing the backward links. */
        let mut labels = vec![0; t_len];
        labels[t_len - 1] = best;
        for t in (0..t_len - 1).rev() {
            labels[t] = self.backward_edge[l * (t + 1) + labels[t + 1]]?;
        }
        Some((labels, max_score))
    }
}
