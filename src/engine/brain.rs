use rand::Rng;

/// Fully connected ReLU network whose weights double as the bird's genome.
#[derive(Debug, Clone)]
pub struct Brain {
    layers: Vec<Layer>,
}

#[derive(Debug, Clone)]
struct Layer {
    inputs: usize,
    /// One row per neuron: `[bias, w_0, .., w_{inputs-1}]`.
    weights: Vec<f32>,
}

impl Layer {
    fn propagate(&self, inputs: &[f32]) -> Vec<f32> {
        self.weights
            .chunks_exact(self.inputs + 1)
            .map(|row| {
                let sum = row[0]
                    + row[1..]
                        .iter()
                        .zip(inputs)
                        .map(|(w, i)| w * i)
                        .sum::<f32>();
                sum.max(0.0)
            })
            .collect()
    }
}

impl Brain {
    pub fn random(topology: &[usize], rng: &mut impl Rng) -> Self {
        let layers = topology
            .windows(2)
            .map(|pair| Layer {
                inputs: pair[0],
                weights: (0..pair[1] * (pair[0] + 1))
                    .map(|_| rng.gen_range(-1.0..=1.0))
                    .collect(),
            })
            .collect();
        Self { layers }
    }

    /// Rebuild a brain with `topology` from a flat chromosome.
    pub fn from_genes(topology: &[usize], genes: &[f32]) -> Self {
        let mut genes = genes.iter().copied();
        let layers = topology
            .windows(2)
            .map(|pair| Layer {
                inputs: pair[0],
                weights: genes.by_ref().take(pair[1] * (pair[0] + 1)).collect(),
            })
            .collect();
        Self { layers }
    }

    pub fn genes(&self) -> Vec<f32> {
        self.layers
            .iter()
            .flat_map(|layer| layer.weights.iter().copied())
            .collect()
    }

    pub fn propagate(&self, inputs: Vec<f32>) -> Vec<f32> {
        self.layers
            .iter()
            .fold(inputs, |inputs, layer| layer.propagate(&inputs))
    }
}
